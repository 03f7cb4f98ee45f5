//! Core domain logic for the sensor relay.
//!
//! Pure logic with no I/O: the reading model and inbound validator, the
//! per-type sliding window store, and the threshold evaluator. The relay
//! server and the consumer-side monitor both build on these types.

pub mod config;
pub mod error;
pub mod protocol;
pub mod reading;
pub mod thresholds;
pub mod types;
pub mod window;
