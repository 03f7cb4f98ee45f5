//! WebSocket connection and reading push loop for the simulator.
//!
//! Connects to the relay, sends one simulated reading per tick, and drains
//! whatever the relay sends back (greeting, echoed readings, notification
//! snapshots) so the socket never backs up.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::simulator::SensorSimulator;

/// Reconnection delay after a WebSocket failure.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Run the push loop until `cancel` fires.
///
/// Reconnects with a fixed delay if the WebSocket connection drops.
pub async fn run(
    ws_url: &str,
    interval: Duration,
    simulator: &SensorSimulator,
    cancel: &CancellationToken,
) {
    loop {
        tracing::info!(url = %ws_url, "Connecting to relay WebSocket");

        tokio::select! {
            _ = cancel.cancelled() => break,
            result = connect_async(ws_url) => match result {
                Ok((ws_stream, _response)) => {
                    tracing::info!("WebSocket connected");
                    run_session(ws_stream, interval, simulator, cancel).await;
                    if cancel.is_cancelled() {
                        break;
                    }
                    tracing::warn!("WebSocket session ended, reconnecting");
                }
                Err(e) => {
                    tracing::error!(error = %e, "WebSocket connection failed");
                }
            },
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
        }
    }
    tracing::info!("Simulator stopped");
}

/// Drive a single WebSocket session: push readings on a timer and drain
/// incoming frames via `tokio::select!`.
async fn run_session(
    ws_stream: WsStream,
    interval: Duration,
    simulator: &SensorSimulator,
    cancel: &CancellationToken,
) {
    let (mut sink, mut stream) = ws_stream.split();
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = send_reading(&mut sink, simulator).await {
                    tracing::error!(error = %e, "Failed to send reading");
                    break;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!(len = text.len(), "Relay message");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Relay closed WebSocket");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong are answered by tungstenite; binary is ignored.
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "WebSocket receive error");
                        break;
                    }
                    None => {
                        tracing::info!("WebSocket stream exhausted");
                        break;
                    }
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Failed to encode reading: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("WebSocket send failed: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Generate one reading and send it as a JSON text frame.
async fn send_reading<S>(sink: &mut S, simulator: &SensorSimulator) -> Result<(), SendError>
where
    S: SinkExt<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let reading = simulator.generate();
    let json = serde_json::to_string(&reading)?;
    tracing::debug!(
        sensor_id = %reading.sensor_id,
        value = reading.value,
        "Sending reading"
    );
    sink.send(Message::Text(json)).await?;
    Ok(())
}
