use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// Every connection is both an ingest source and a subscriber: text frames
/// it sends are relayed, and it receives every relayed reading.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the hub (which queues the greeting).
///   2. Spawns a sender task that forwards messages from the hub channel.
///   3. Relays inbound text frames on the current task, in arrival order.
///   4. Unregisters on close or transport error.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = state.hub.register(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Err(e) = state.relay.ingest(text.as_str()).await {
                    tracing::warn!(conn_id = %conn_id, error = %e, "Dropped invalid message");
                }
            }
            Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    if let Err(e) = state.relay.ingest(text).await {
                        tracing::warn!(conn_id = %conn_id, error = %e, "Dropped invalid message");
                    }
                }
                Err(e) => {
                    tracing::warn!(conn_id = %conn_id, error = %e, "Dropped non-UTF-8 message");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Ping(_)) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    let connected_secs = state
        .hub
        .unregister(&conn_id)
        .await
        .map(|age| age.num_seconds());
    send_task.abort();
    tracing::info!(conn_id = %conn_id, ?connected_secs, "WebSocket disconnected");
}
