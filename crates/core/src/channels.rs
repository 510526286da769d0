//! Notification delivery channel names.

pub const CHANNEL_IN_APP: &str = "in_app";
pub const CHANNEL_PUSH: &str = "push";
