//! Integration tests for the sensor simulator.

use rand::rngs::StdRng;
use rand::SeedableRng;
use sensorhub_agent::simulator::{SensorSimulator, SimulatedSensor, DEFAULT_SENSORS};
use sensorhub_core::reading::{parse_reading, SensorType};

// ---------------------------------------------------------------------------
// Test: Generated values stay inside each sensor's range
// ---------------------------------------------------------------------------

#[test]
fn generated_values_stay_in_range() {
    let simulator = SensorSimulator::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let reading = simulator.generate_with(&mut rng);
        let sensor = DEFAULT_SENSORS
            .iter()
            .find(|s| s.sensor_id == reading.sensor_id)
            .expect("reading from a known sensor");

        assert_eq!(reading.sensor_type, sensor.sensor_type);
        assert_eq!(reading.unit, sensor.unit);
        assert!(reading.value >= sensor.min && reading.value < sensor.max);
    }
}

// ---------------------------------------------------------------------------
// Test: Every sensor is eventually picked
// ---------------------------------------------------------------------------

#[test]
fn all_sensors_are_picked() {
    let simulator = SensorSimulator::default();
    let mut rng = StdRng::seed_from_u64(42);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        seen.insert(simulator.generate_with(&mut rng).sensor_type);
    }
    assert_eq!(seen.len(), SensorType::ALL.len());
}

// ---------------------------------------------------------------------------
// Test: The wire payload passes the relay's validator
// ---------------------------------------------------------------------------

#[test]
fn payload_is_accepted_by_the_validator() {
    let simulator = SensorSimulator::default();
    let outbound = simulator.generate();
    let json = serde_json::to_string(&outbound).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("sensorId").is_some());
    assert!(parsed.get("timestamp").is_none());

    let reading = parse_reading(&json).unwrap();
    assert_eq!(reading.sensor_id, outbound.sensor_id);
    assert_eq!(reading.value, outbound.value);
}

// ---------------------------------------------------------------------------
// Test: Custom sensor sets
// ---------------------------------------------------------------------------

#[test]
fn empty_sensor_set_is_rejected() {
    assert!(SensorSimulator::new(Vec::new()).is_none());
}

#[test]
fn degenerate_range_yields_fixed_value() {
    let simulator = SensorSimulator::new(vec![SimulatedSensor {
        sensor_id: "FIXED",
        sensor_type: SensorType::Pressure,
        unit: "hPa",
        min: 1000.0,
        max: 1000.0,
    }])
    .unwrap();

    let reading = simulator.generate_with(&mut StdRng::seed_from_u64(1));
    assert_eq!(reading.value, 1000.0);
}
