//! Hearth event bus and push delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`FinanceEvent`]: the domain event envelope, always scoped to a family.
//! - [`push`]: payload-less Web Push delivery signed with VAPID.

pub mod bus;
pub mod push;

pub use bus::{EventBus, FinanceEvent};
pub use push::{PushError, PushSender, PushTarget, Urgency, VapidConfig, WebPushSender};
