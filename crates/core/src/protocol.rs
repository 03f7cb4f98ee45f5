//! Wire-level message discriminators shared by the relay and its clients.
//!
//! Sensor readings travel as bare records (`sensorId`, `type`, `value`,
//! `unit`). Every other record the relay emits carries one of the `type`
//! values below, none of which is a sensor type and none of which has a
//! `value` field, so consumers never mistake them for readings.

/// Discriminator of the one-time greeting sent to a connection on register.
pub const MSG_TYPE_CONNECTION: &str = "connection";

/// Discriminator of a full notification-list snapshot pushed to observers.
pub const MSG_TYPE_NOTIFICATIONS: &str = "notifications";

/// Human-readable text carried by the greeting record.
pub const GREETING_MESSAGE: &str = "Connected to WebSocket server";

/// Build the greeting record sent once to each newly registered connection.
pub fn greeting() -> serde_json::Value {
    serde_json::json!({
        "type": MSG_TYPE_CONNECTION,
        "message": GREETING_MESSAGE,
    })
}
