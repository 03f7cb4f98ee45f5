//! Bridge from the synchronous dispatcher listener to the async hub.
//!
//! Dispatcher listeners run inside the dispatcher's critical section and
//! cannot await, so the listener only enqueues the snapshot. A separate task
//! drains the queue and broadcasts each snapshot as a non-sensor record.

use std::sync::Arc;

use sensorhub_core::protocol::MSG_TYPE_NOTIFICATIONS;
use sensorhub_events::{Notification, NotificationDispatcher, SubscriptionToken};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::ws::BroadcastHub;

/// `{"type": "notifications", "data": [...]}`.
#[derive(Debug, Serialize)]
pub struct NotificationsFrame<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: &'a [Notification],
}

impl<'a> NotificationsFrame<'a> {
    pub fn new(data: &'a [Notification]) -> Self {
        Self {
            kind: MSG_TYPE_NOTIFICATIONS,
            data,
        }
    }
}

/// Forwards every dispatcher snapshot to all hub connections.
pub struct NotificationForwarder {
    hub: Arc<BroadcastHub>,
}

impl NotificationForwarder {
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self { hub }
    }

    /// Subscribe a queueing listener on `dispatcher`.
    ///
    /// Unsubscribing the returned token drops the sender, which ends
    /// [`run`](Self::run).
    pub fn subscribe(
        dispatcher: &NotificationDispatcher,
    ) -> (SubscriptionToken, mpsc::UnboundedReceiver<Vec<Notification>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = dispatcher.subscribe(move |list: &[Notification]| {
            let _ = tx.send(list.to_vec());
        });
        (token, rx)
    }

    /// Run the forwarding loop until the channel closes.
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<Vec<Notification>>) {
        while let Some(list) = receiver.recv().await {
            match self.hub.broadcast(&NotificationsFrame::new(&list)).await {
                Ok(delivered) => {
                    tracing::debug!(count = list.len(), delivered, "Notification snapshot pushed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode notification snapshot");
                }
            }
        }
        tracing::info!("Notification channel closed, forwarder shutting down");
    }
}
