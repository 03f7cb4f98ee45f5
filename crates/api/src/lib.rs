//! Sensor relay server library.
//!
//! Exposes the core building blocks (config, state, relay pipeline, error
//! handling, routes, WebSocket hub) so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod notifications;
pub mod persistence;
pub mod relay;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
