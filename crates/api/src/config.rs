pub use sensorhub_core::config::ConfigError;
use sensorhub_core::config::{
    parse_bool, parse_var, parse_window_capacity, thresholds_from_lookup,
};
use sensorhub_core::thresholds::ThresholdConfig;
use sensorhub_core::window::DEFAULT_WINDOW_CAPACITY;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Samples kept per sensor type (default: `20`).
    pub window_capacity: usize,
    /// Initial value of the dispatcher's sound flag (default: `true`).
    pub sound_enabled: bool,
    /// Initial thresholds; operators may change them at runtime.
    pub thresholds: ThresholdConfig,
    /// Readings retained by the in-memory store (default: `10000`).
    pub persistence_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            request_timeout_secs: 30,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            sound_enabled: true,
            thresholds: ThresholdConfig::default(),
            persistence_capacity: 10_000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `5000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `WINDOW_CAPACITY`       | `20`                    |
    /// | `SOUND_ENABLED`         | `true`                  |
    /// | `THRESHOLD_TEMPERATURE` | `15,30`                 |
    /// | `THRESHOLD_HUMIDITY`    | `30,70`                 |
    /// | `THRESHOLD_PRESSURE`    | `980,1020`              |
    /// | `PERSISTENCE_CAPACITY`  | `10000`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through
    /// `lookup`, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT", defaults.port)?;

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let request_timeout_secs =
            parse_var(&lookup, "REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;

        let window_capacity = parse_window_capacity(&lookup, defaults.window_capacity)?;

        let sound_enabled = parse_bool(&lookup, "SOUND_ENABLED", defaults.sound_enabled)?;
        let thresholds = thresholds_from_lookup(&lookup, defaults.thresholds)?;
        let persistence_capacity =
            parse_var(&lookup, "PERSISTENCE_CAPACITY", defaults.persistence_capacity)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            window_capacity,
            sound_enabled,
            thresholds,
            persistence_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sensorhub_core::thresholds::Threshold;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.window_capacity, 20);
        assert!(config.sound_enabled);
        assert_eq!(config.thresholds, ThresholdConfig::default());
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("SOUND_ENABLED", "off"),
            ("THRESHOLD_PRESSURE", "990,1010"),
            ("WINDOW_CAPACITY", "5"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.sound_enabled);
        assert_eq!(config.thresholds.pressure, Threshold { min: 990.0, max: 1010.0 });
        assert_eq!(config.window_capacity, 5);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "abc")])).unwrap_err();
        assert_eq!(err.var, "PORT");

        let err = ServerConfig::from_lookup(lookup_from(&[("WINDOW_CAPACITY", "0")])).unwrap_err();
        assert_eq!(err.var, "WINDOW_CAPACITY");

        let err =
            ServerConfig::from_lookup(lookup_from(&[("THRESHOLD_HUMIDITY", "70,30")])).unwrap_err();
        assert_eq!(err.var, "THRESHOLD_HUMIDITY");

        let err = ServerConfig::from_lookup(lookup_from(&[("SOUND_ENABLED", "maybe")])).unwrap_err();
        assert_eq!(err.var, "SOUND_ENABLED");
    }
}
