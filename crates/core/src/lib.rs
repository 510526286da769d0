//! Domain types and pure business rules for the Hearth family finance service.
//!
//! Nothing in this crate touches the database or the network; the `db` and
//! `api` crates call into it for validation and computation.

pub mod budget;
pub mod category;
pub mod channels;
pub mod dashboard;
pub mod error;
pub mod event_types;
pub mod investment;
pub mod money;
pub mod period;
pub mod receivable;
pub mod report;
pub mod roles;
pub mod search;
pub mod sync;
pub mod types;
