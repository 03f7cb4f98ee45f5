//! Pushes dispatcher snapshots to live WebSocket observers.

mod forwarder;

pub use forwarder::{NotificationForwarder, NotificationsFrame};
