//! Event-driven notification delivery.
//!
//! [`NotificationRouter`] consumes the event bus, stores one in-app
//! notification per recipient, and wakes the recipients' browsers with a
//! Web Push.

pub mod router;
pub mod templates;

pub use router::NotificationRouter;
