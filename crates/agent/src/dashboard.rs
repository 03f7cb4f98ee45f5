//! Consumer-side state fed by the relay's live feed.
//!
//! The monitor owns one [`Dashboard`]. Every text frame from the relay is
//! classified: sensor readings go into the local window store and through
//! the local threshold check, while the greeting and notification
//! snapshots are recognised as non-sensor records and left alone.

use std::sync::Arc;

use chrono::Utc;
use sensorhub_core::protocol::{MSG_TYPE_CONNECTION, MSG_TYPE_NOTIFICATIONS};
use sensorhub_core::reading::{reading_from_value, Reading, SensorType};
use sensorhub_core::thresholds::{check_reading, ThresholdBreach, ThresholdConfig};
use sensorhub_core::window::{WindowStats, WindowStore};
use sensorhub_events::{NotificationDispatcher, NotificationEvent};
use serde_json::Value;

/// How one inbound frame was interpreted.
#[derive(Debug, PartialEq)]
pub enum Inbound {
    /// A valid reading, with the breach it caused, if any.
    Reading {
        reading: Reading,
        breach: Option<ThresholdBreach>,
    },
    /// The relay's one-time greeting.
    Greeting(String),
    /// A relay-side notification snapshot of the given length.
    Notifications(usize),
    /// Anything else; dropped.
    Ignored,
}

pub struct Dashboard {
    windows: WindowStore,
    thresholds: ThresholdConfig,
    dispatcher: Arc<NotificationDispatcher>,
}

impl Dashboard {
    pub fn new(
        windows: WindowStore,
        thresholds: ThresholdConfig,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            windows,
            thresholds,
            dispatcher,
        }
    }

    pub fn windows(&self) -> &WindowStore {
        &self.windows
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Replace the local thresholds. Applies from the next reading.
    pub fn set_thresholds(&mut self, thresholds: ThresholdConfig) {
        self.thresholds = thresholds;
    }

    pub fn stats(&self, sensor_type: SensorType) -> Option<WindowStats> {
        self.windows.stats(sensor_type)
    }

    /// Classify and apply one text frame from the relay.
    pub fn handle_text(&mut self, text: &str) -> Inbound {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Dropped unparseable frame");
                return Inbound::Ignored;
            }
        };

        match value.get("type").and_then(Value::as_str) {
            Some(MSG_TYPE_CONNECTION) => {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                tracing::info!(%message, "Relay greeting");
                return Inbound::Greeting(message);
            }
            Some(MSG_TYPE_NOTIFICATIONS) => {
                let count = value
                    .get("data")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                tracing::debug!(count, "Relay notification snapshot");
                return Inbound::Notifications(count);
            }
            _ => {}
        }

        match reading_from_value(value, Utc::now()) {
            Ok(reading) => {
                let breach = self.apply(&reading);
                Inbound::Reading { reading, breach }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignored non-sensor frame");
                Inbound::Ignored
            }
        }
    }

    /// Evaluate against the current thresholds, alert, then record.
    fn apply(&mut self, reading: &Reading) -> Option<ThresholdBreach> {
        let breach = check_reading(reading, &self.thresholds);
        if let Some(breach) = &breach {
            self.dispatcher
                .notify(NotificationEvent::threshold_alert(breach));
        }
        self.windows.append(reading.sensor_type, reading.sample());
        breach
    }
}
