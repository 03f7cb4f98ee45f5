//! Helpers for reading configuration through a lookup function.
//!
//! Binaries pass `|var| std::env::var(var).ok()`; tests pass a map.

use std::fmt::Display;
use std::str::FromStr;

use crate::reading::SensorType;
use crate::thresholds::{Threshold, ThresholdConfig};

/// A configuration variable that is present but unusable.
#[derive(Debug, thiserror::Error)]
#[error("{var} has invalid value {value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(var: &'static str, value: &str, reason: impl Display) -> Self {
        Self {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Parse `var` with [`FromStr`], falling back to `default` when unset.
pub fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::new(var, &raw, e)),
        None => Ok(default),
    }
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::new(var, &raw, "expected true or false")),
        },
        None => Ok(default),
    }
}

/// Window capacity from `WINDOW_CAPACITY`; zero is rejected.
pub fn parse_window_capacity<F>(lookup: &F, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let capacity = parse_var(lookup, "WINDOW_CAPACITY", default)?;
    if capacity == 0 {
        return Err(ConfigError::new("WINDOW_CAPACITY", "0", "must be at least 1"));
    }
    Ok(capacity)
}

/// Apply `THRESHOLD_TEMPERATURE`, `THRESHOLD_HUMIDITY` and
/// `THRESHOLD_PRESSURE` (each `"min,max"`) on top of `base`.
pub fn thresholds_from_lookup<F>(
    lookup: &F,
    mut base: ThresholdConfig,
) -> Result<ThresholdConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, sensor_type) in [
        ("THRESHOLD_TEMPERATURE", SensorType::Temperature),
        ("THRESHOLD_HUMIDITY", SensorType::Humidity),
        ("THRESHOLD_PRESSURE", SensorType::Pressure),
    ] {
        if let Some(raw) = lookup(var) {
            let threshold: Threshold = raw.parse().map_err(|e| ConfigError::new(var, &raw, e))?;
            base.set(sensor_type, threshold);
        }
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn unset_variables_use_defaults() {
        let l = lookup(&[]);
        assert_eq!(parse_var(&l, "PORT", 5000u16).unwrap(), 5000);
        assert!(parse_bool(&l, "SOUND_ENABLED", true).unwrap());
        assert_eq!(
            thresholds_from_lookup(&l, ThresholdConfig::default()).unwrap(),
            ThresholdConfig::default()
        );
    }

    #[test]
    fn threshold_override_replaces_one_type() {
        let l = lookup(&[("THRESHOLD_PRESSURE", "990,1010")]);
        let config = thresholds_from_lookup(&l, ThresholdConfig::default()).unwrap();
        assert_eq!(config.pressure, Threshold { min: 990.0, max: 1010.0 });
        assert_eq!(config.temperature, ThresholdConfig::default().temperature);
    }

    #[test]
    fn errors_name_the_variable() {
        let l = lookup(&[
            ("PORT", "abc"),
            ("SOUND_ENABLED", "maybe"),
            ("WINDOW_CAPACITY", "0"),
            ("THRESHOLD_HUMIDITY", "70,30"),
        ]);
        assert_eq!(parse_var(&l, "PORT", 1u16).unwrap_err().var, "PORT");
        assert_eq!(parse_bool(&l, "SOUND_ENABLED", true).unwrap_err().var, "SOUND_ENABLED");
        assert_eq!(parse_window_capacity(&l, 20).unwrap_err().var, "WINDOW_CAPACITY");
        assert_eq!(
            thresholds_from_lookup(&l, ThresholdConfig::default())
                .unwrap_err()
                .var,
            "THRESHOLD_HUMIDITY"
        );
    }
}
