use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use sensorhub_core::protocol;
use sensorhub_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
///
/// Unbounded: a slow client grows its own queue and never throttles the
/// relay.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// The set of live subscriber connections and the fan-out over them.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. The lock is never held while a message
/// is handed to a connection.
pub struct BroadcastHub {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl BroadcastHub {
    /// Create a new, empty hub.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection and queue the greeting for it alone.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn register(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let greeting = Message::Text(protocol::greeting().to_string().into());
        let _ = tx.send(greeting);

        let conn = WsConnection {
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID. Removing an unknown ID is a no-op.
    ///
    /// Returns how long the connection was registered, or `None` if it was
    /// not present.
    pub async fn unregister(&self, conn_id: &str) -> Option<chrono::TimeDelta> {
        let conn = self.connections.write().await.remove(conn_id)?;
        Some(chrono::Utc::now() - conn.connected_at)
    }

    /// Serialize `payload` once and deliver it to every connection.
    pub async fn broadcast<T: Serialize>(&self, payload: &T) -> Result<usize, serde_json::Error> {
        let text = serde_json::to_string(payload)?;
        Ok(self.broadcast_text(text).await)
    }

    /// Deliver a text frame to every connection registered right now.
    ///
    /// Membership is snapshotted before sending, so a connection that joins
    /// during the call does not receive the frame. A failed send to one
    /// connection (its receiver is gone) is skipped without affecting the
    /// others. Returns the number of connections the frame was queued for.
    pub async fn broadcast_text(&self, text: String) -> usize {
        let targets: Vec<(String, WsSender)> = self
            .connections
            .read()
            .await
            .iter()
            .map(|(id, conn)| (id.clone(), conn.sender.clone()))
            .collect();

        let message = Message::Text(text.into());
        let mut delivered = 0;
        for (conn_id, sender) in targets {
            match sender.send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::debug!(conn_id = %conn_id, "Skipped closed connection"),
            }
        }
        delivered
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
