//! Sensor readings and the inbound reading validator.
//!
//! Inbound messages are untrusted text. [`parse_reading`] accepts a message
//! only when it carries a non-empty `sensorId`, a `type` from the closed
//! [`SensorType`] set and a finite numeric `value`. Everything else is
//! rejected with a [`ReadingError`] that the caller logs and drops.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;
use crate::window::Sample;

// ---------------------------------------------------------------------------
// SensorType
// ---------------------------------------------------------------------------

/// The closed set of sensor kinds the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Humidity,
    Pressure,
}

impl SensorType {
    /// Every sensor type, in display order.
    pub const ALL: [SensorType; 3] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Pressure,
    ];

    /// Wire name of this sensor type.
    pub fn as_str(self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Pressure => "pressure",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = ReadingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(SensorType::Temperature),
            "humidity" => Ok(SensorType::Humidity),
            "pressure" => Ok(SensorType::Pressure),
            other => Err(ReadingError::UnknownSensorType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One validated, timestamped sensor measurement.
///
/// Immutable once produced by the validator. Serializes to the wire and
/// persisted record shape `{sensorId, type, value, unit, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub sensor_id: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(rename = "timestamp")]
    pub time: Timestamp,
}

impl Reading {
    /// The `(time, value)` pair stored in the sliding window.
    pub fn sample(&self) -> Sample {
        Sample {
            time: self.time,
            value: self.value,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an inbound message was not accepted as a reading.
#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    /// The message is not a JSON object (or not JSON at all).
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required field is absent or null.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("sensorId must not be empty")]
    EmptySensorId,

    #[error("Unknown sensor type: {0}")]
    UnknownSensorType(String),

    /// `value` is present but is not a finite number.
    #[error("value must be a finite number")]
    InvalidValue,
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Loose inbound shape: every field optional so that each missing or
/// mistyped field maps to its own [`ReadingError`] variant.
#[derive(Debug, Deserialize)]
struct WireReading {
    #[serde(rename = "sensorId")]
    sensor_id: Option<String>,
    #[serde(rename = "type")]
    sensor_type: Option<serde_json::Value>,
    value: Option<serde_json::Value>,
    unit: Option<serde_json::Value>,
    timestamp: Option<serde_json::Value>,
}

/// Parse and validate an inbound text message, stamping arrival time now.
pub fn parse_reading(raw: &str) -> Result<Reading, ReadingError> {
    parse_reading_at(raw, Utc::now())
}

/// Parse and validate an inbound text message.
///
/// `received_at` is used as the reading time unless the message carries an
/// RFC 3339 `timestamp` of its own.
pub fn parse_reading_at(raw: &str, received_at: Timestamp) -> Result<Reading, ReadingError> {
    let wire: WireReading = serde_json::from_str(raw)?;
    validate(wire, received_at)
}

/// Validate an already-decoded JSON value (used by the HTTP surface).
pub fn reading_from_value(
    value: serde_json::Value,
    received_at: Timestamp,
) -> Result<Reading, ReadingError> {
    let wire: WireReading = serde_json::from_value(value)?;
    validate(wire, received_at)
}

fn validate(wire: WireReading, received_at: Timestamp) -> Result<Reading, ReadingError> {
    let sensor_id = wire
        .sensor_id
        .ok_or(ReadingError::MissingField("sensorId"))?;
    if sensor_id.trim().is_empty() {
        return Err(ReadingError::EmptySensorId);
    }

    let sensor_type = match wire.sensor_type {
        Some(serde_json::Value::String(s)) => s.parse::<SensorType>()?,
        Some(serde_json::Value::Null) | None => return Err(ReadingError::MissingField("type")),
        Some(other) => return Err(ReadingError::UnknownSensorType(other.to_string())),
    };

    let value = match wire.value {
        Some(serde_json::Value::Null) | None => return Err(ReadingError::MissingField("value")),
        Some(v) => v.as_f64().ok_or(ReadingError::InvalidValue)?,
    };
    if !value.is_finite() {
        return Err(ReadingError::InvalidValue);
    }

    // Unit is opaque: strings pass through, anything else is kept verbatim.
    let unit = match wire.unit {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let time = wire
        .timestamp
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(received_at);

    Ok(Reading {
        sensor_id,
        sensor_type,
        value,
        unit,
        time,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
