//! Live-feed client that keeps a [`Dashboard`] current and reports link
//! transitions.
//!
//! The socket's up/down state is pushed into a [`ConnectivitySignal`]; a
//! [`ConnectivityMonitor`](sensorhub_events::ConnectivityMonitor) attached
//! to that signal turns transitions into notifications. Failed connects
//! are retried with exponential backoff until cancelled.

use futures::{SinkExt, StreamExt};
use sensorhub_events::{ConnectivitySignal, LinkState};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::dashboard::{Dashboard, Inbound};
use crate::reconnect::{next_delay, ReconnectConfig};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Link state before the first connection attempt. The link has never been
/// up, so a failed first attempt is not reported as a loss.
pub const INITIAL_LINK_STATE: LinkState = LinkState::Down;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Cancelled,
    Disconnected,
}

/// Follow the relay at `ws_url` until `cancel` fires.
pub async fn run(
    ws_url: &str,
    dashboard: &mut Dashboard,
    signal: &ConnectivitySignal,
    reconnect: &ReconnectConfig,
    cancel: &CancellationToken,
) {
    let mut delay = reconnect.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        tracing::info!(url = %ws_url, attempt, "Connecting to relay");

        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connect_async(ws_url) => result,
        };

        match connected {
            Ok((ws_stream, _response)) => {
                signal.set_state(LinkState::Up);
                delay = reconnect.initial_delay;
                attempt = 0;

                let end = run_session(ws_stream, dashboard, cancel).await;
                if end == SessionEnd::Cancelled {
                    break;
                }
                signal.set_state(LinkState::Down);
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "Relay connection failed");
                signal.set_state(LinkState::Down);
            }
        }

        tracing::info!(delay_ms = delay.as_millis() as u64, "Waiting before reconnect");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = next_delay(delay, reconnect);
    }

    tracing::info!("Monitor stopped");
}

/// Feed one session's frames into `dashboard` until it ends.
pub async fn run_session(
    ws_stream: WsStream,
    dashboard: &mut Dashboard,
    cancel: &CancellationToken,
) -> SessionEnd {
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return SessionEnd::Cancelled;
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Inbound::Reading { reading, breach } = dashboard.handle_text(&text) {
                        tracing::info!(
                            sensor_id = %reading.sensor_id,
                            sensor_type = %reading.sensor_type,
                            value = reading.value,
                            unit = %reading.unit,
                            alert = breach.is_some(),
                            "Reading"
                        );
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "Relay closed WebSocket");
                    return SessionEnd::Disconnected;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "WebSocket receive error");
                    return SessionEnd::Disconnected;
                }
                None => return SessionEnd::Disconnected,
            },
        }
    }
}
