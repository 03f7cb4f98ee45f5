//! WebSocket infrastructure for the live feed.
//!
//! Provides the broadcast hub, heartbeat, and the HTTP upgrade handler used
//! by Axum routes.

mod handler;
mod heartbeat;
pub mod hub;

pub use handler::ws_handler;
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use hub::BroadcastHub;
