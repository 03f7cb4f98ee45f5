//! `sensorhub-agent` library crate.
//!
//! The ingest simulator and the consumer-side monitor. Re-exports internal
//! modules for integration testing; the binaries live in `main.rs` and
//! `bin/monitor.rs`.

pub mod config;
pub mod dashboard;
pub mod monitor;
pub mod reconnect;
pub mod sender;
pub mod simulator;
