//! Environment configuration for both agent binaries.

use std::time::Duration;

pub use sensorhub_core::config::ConfigError;
use sensorhub_core::config::{
    parse_bool, parse_var, parse_window_capacity, thresholds_from_lookup,
};
use sensorhub_core::thresholds::ThresholdConfig;
use sensorhub_core::window::DEFAULT_WINDOW_CAPACITY;

/// | Env Var                 | Default                  |
/// |-------------------------|--------------------------|
/// | `RELAY_WS_URL`          | `ws://localhost:5000/ws` |
/// | `SIMULATOR_INTERVAL_MS` | `2000`                   |
/// | `SOUND_ENABLED`         | `true`                   |
/// | `WINDOW_CAPACITY`       | `20`                     |
/// | `THRESHOLD_*`           | as the relay             |
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub ws_url: String,
    /// Time between simulated readings.
    pub interval: Duration,
    pub sound_enabled: bool,
    pub window_capacity: usize,
    pub thresholds: ThresholdConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:5000/ws".to_string(),
            interval: Duration::from_millis(2000),
            sound_enabled: true,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let interval_ms = parse_var(&lookup, "SIMULATOR_INTERVAL_MS", 2000u64)?;
        if interval_ms == 0 {
            return Err(ConfigError::new(
                "SIMULATOR_INTERVAL_MS",
                "0",
                "must be at least 1",
            ));
        }

        Ok(Self {
            ws_url: lookup("RELAY_WS_URL").unwrap_or(defaults.ws_url),
            interval: Duration::from_millis(interval_ms),
            sound_enabled: parse_bool(&lookup, "SOUND_ENABLED", defaults.sound_enabled)?,
            window_capacity: parse_window_capacity(&lookup, defaults.window_capacity)?,
            thresholds: thresholds_from_lookup(&lookup, defaults.thresholds)?,
        })
    }
}
