//! Synthetic sensor readings for driving the relay without hardware.
//!
//! Each tick picks one of the configured sensors at random and produces a
//! value uniformly distributed over that sensor's range. The relay stamps
//! the arrival time, so readings carry no timestamp of their own.

use rand::Rng;
use sensorhub_core::reading::SensorType;
use serde::Serialize;

/// One simulated sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSensor {
    pub sensor_id: &'static str,
    pub sensor_type: SensorType,
    pub unit: &'static str,
    /// Lower bound of generated values (inclusive).
    pub min: f64,
    /// Upper bound of generated values (exclusive).
    pub max: f64,
}

/// The default sensor set: one per type.
pub const DEFAULT_SENSORS: [SimulatedSensor; 3] = [
    SimulatedSensor {
        sensor_id: "TEMP001",
        sensor_type: SensorType::Temperature,
        unit: "°C",
        min: 20.0,
        max: 30.0,
    },
    SimulatedSensor {
        sensor_id: "HUM001",
        sensor_type: SensorType::Humidity,
        unit: "%",
        min: 30.0,
        max: 70.0,
    },
    SimulatedSensor {
        sensor_id: "PRESS001",
        sensor_type: SensorType::Pressure,
        unit: "hPa",
        min: 980.0,
        max: 1020.0,
    },
];

/// Wire payload sent to the relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundReading {
    pub sensor_id: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
}

pub struct SensorSimulator {
    sensors: Vec<SimulatedSensor>,
}

impl SensorSimulator {
    /// Simulate `sensors`. Returns `None` for an empty set.
    pub fn new(sensors: Vec<SimulatedSensor>) -> Option<Self> {
        if sensors.is_empty() {
            return None;
        }
        Some(Self { sensors })
    }

    pub fn sensors(&self) -> &[SimulatedSensor] {
        &self.sensors
    }

    /// Produce one reading from a randomly chosen sensor.
    pub fn generate(&self) -> OutboundReading {
        self.generate_with(&mut rand::rng())
    }

    /// Same as [`generate`](Self::generate) with a caller-supplied RNG.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> OutboundReading {
        let sensor = &self.sensors[rng.random_range(0..self.sensors.len())];
        let value = if sensor.min < sensor.max {
            rng.random_range(sensor.min..sensor.max)
        } else {
            sensor.min
        };

        OutboundReading {
            sensor_id: sensor.sensor_id.to_string(),
            sensor_type: sensor.sensor_type,
            value,
            unit: sensor.unit.to_string(),
        }
    }
}

impl Default for SensorSimulator {
    fn default() -> Self {
        Self {
            sensors: DEFAULT_SENSORS.to_vec(),
        }
    }
}
