//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod budget;
pub mod category;
pub mod dashboard;
pub mod expense;
pub mod family;
pub mod income;
pub mod investment;
pub mod notification;
pub mod push_subscription;
pub mod receivable;
pub mod session;
pub mod user;
