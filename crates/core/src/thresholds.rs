//! Threshold configuration and the stateless threshold evaluator.
//!
//! Pure logic. The caller owns the current [`ThresholdConfig`] and passes it
//! in on every call, so an operator update takes effect on the next reading
//! and never retroactively.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reading::{Reading, SensorType};

/// Inclusive acceptable range for one sensor type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub min: f64,
    pub max: f64,
}

impl Threshold {
    /// Build a threshold, rejecting non-finite bounds and `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, CoreError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(CoreError::Validation(
                "threshold bounds must be finite numbers".to_string(),
            ));
        }
        if min > max {
            return Err(CoreError::Validation(format!(
                "threshold min ({min}) must not exceed max ({max})"
            )));
        }
        Ok(Self { min, max })
    }
}

/// Parses `"min,max"`, e.g. `"15,30"`.
impl FromStr for Threshold {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s.split_once(',').ok_or_else(|| {
            CoreError::Validation(format!("threshold must be \"min,max\", got {s:?}"))
        })?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| CoreError::Validation(format!("invalid threshold bound {part:?}: {e}")))
        };
        Self::new(parse(min)?, parse(max)?)
    }
}

/// Current thresholds for every sensor type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub temperature: Threshold,
    pub humidity: Threshold,
    pub pressure: Threshold,
}

impl ThresholdConfig {
    pub fn get(&self, sensor_type: SensorType) -> Threshold {
        match sensor_type {
            SensorType::Temperature => self.temperature,
            SensorType::Humidity => self.humidity,
            SensorType::Pressure => self.pressure,
        }
    }

    pub fn set(&mut self, sensor_type: SensorType, threshold: Threshold) {
        match sensor_type {
            SensorType::Temperature => self.temperature = threshold,
            SensorType::Humidity => self.humidity = threshold,
            SensorType::Pressure => self.pressure = threshold,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temperature: Threshold {
                min: 15.0,
                max: 30.0,
            },
            humidity: Threshold {
                min: 30.0,
                max: 70.0,
            },
            pressure: Threshold {
                min: 980.0,
                max: 1020.0,
            },
        }
    }
}

/// Which side of the range a value fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Low,
    High,
    None,
}

/// Result of evaluating one value against its type's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub exceeded: bool,
    pub direction: Direction,
}

/// Is `value` outside the configured `[min, max]` for `sensor_type`?
///
/// Bounds are inclusive: a value equal to `min` or `max` is in range.
pub fn evaluate(sensor_type: SensorType, value: f64, thresholds: &ThresholdConfig) -> Evaluation {
    let threshold = thresholds.get(sensor_type);
    let direction = if value < threshold.min {
        Direction::Low
    } else if value > threshold.max {
        Direction::High
    } else {
        Direction::None
    };

    Evaluation {
        exceeded: direction != Direction::None,
        direction,
    }
}

/// A reading that fell outside its type's configured range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdBreach {
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
    pub direction: Direction,
    pub threshold: Threshold,
}

impl ThresholdBreach {
    /// User-facing alert text, e.g. `"temperature is too high: 35 °C"`.
    pub fn message(&self) -> String {
        let side = match self.direction {
            Direction::Low => "low",
            _ => "high",
        };
        format!(
            "{} is too {side}: {} {}",
            self.sensor_type, self.value, self.unit
        )
        .trim_end()
        .to_string()
    }
}

/// Evaluate a reading and describe the breach, if any.
pub fn check_reading(reading: &Reading, thresholds: &ThresholdConfig) -> Option<ThresholdBreach> {
    let evaluation = evaluate(reading.sensor_type, reading.value, thresholds);
    if !evaluation.exceeded {
        return None;
    }

    Some(ThresholdBreach {
        sensor_id: reading.sensor_id.clone(),
        sensor_type: reading.sensor_type,
        value: reading.value,
        unit: reading.unit.clone(),
        direction: evaluation.direction,
        threshold: thresholds.get(reading.sensor_type),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
