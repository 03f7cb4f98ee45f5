//! Notification records and the events that create them.
//!
//! A [`NotificationEvent`] is what a producer hands to
//! [`NotificationDispatcher::notify`](crate::NotificationDispatcher::notify);
//! the dispatcher turns it into a [`Notification`] by assigning an id,
//! a timestamp and `read = false`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sensorhub_core::thresholds::ThresholdBreach;

/// Dispatcher-assigned notification identifier (monotonic per dispatcher).
pub type NotificationId = u64;

/// What kind of event a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ThresholdAlert,
    SystemStatus,
    ConnectionStatus,
    DataExport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

// ---------------------------------------------------------------------------
// NotificationEvent
// ---------------------------------------------------------------------------

/// An alert-worthy event submitted to the dispatcher.
///
/// Constructed via [`NotificationEvent::new`] and adjusted with
/// [`with_priority`](Self::with_priority) and [`silent`](Self::silent).
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub kind: NotificationType,
    pub message: String,
    pub priority: Priority,
    /// Suppresses the audio cue even for high-priority events.
    pub silent: bool,
}

impl NotificationEvent {
    /// Create a normal-priority, non-silent event.
    pub fn new(kind: NotificationType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            priority: Priority::Normal,
            silent: false,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// High-priority alert for a reading outside its configured range.
    pub fn threshold_alert(breach: &ThresholdBreach) -> Self {
        Self::new(NotificationType::ThresholdAlert, breach.message()).with_priority(Priority::High)
    }

    /// Normal-priority connection status change.
    pub fn connection_status(connected: bool) -> Self {
        let message = if connected {
            "Connection restored"
        } else {
            "Connection lost"
        };
        Self::new(NotificationType::ConnectionStatus, message)
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A dispatcher-owned record shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    pub priority: Priority,
    pub silent: bool,
}

impl Notification {
    pub(crate) fn from_event(id: NotificationId, event: NotificationEvent) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            read: false,
            kind: event.kind,
            message: event.message,
            priority: event.priority,
            silent: event.silent,
        }
    }
}
