//! Per-type sliding window of recent samples.
//!
//! Each sensor type owns a bounded FIFO buffer: appends go to the back and,
//! once the buffer holds `capacity` samples, every append evicts the oldest
//! one. Samples are kept in arrival order; out-of-order `time` values are
//! stored as received and never re-sorted.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reading::SensorType;
use crate::types::Timestamp;

/// Number of samples retained per sensor type unless configured otherwise.
pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// One `(time, value)` point in a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: Timestamp,
    pub value: f64,
}

/// Summary statistics over the current contents of one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Last value minus first value, in arrival order.
    pub trend: f64,
}

/// Bounded recent history for every sensor type.
#[derive(Debug, Clone)]
pub struct WindowStore {
    capacity: usize,
    windows: HashMap<SensorType, VecDeque<Sample>>,
}

impl WindowStore {
    /// Create a store retaining at most `capacity` samples per type.
    ///
    /// Returns a validation error when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CoreError> {
        if capacity == 0 {
            return Err(CoreError::Validation(
                "window capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self::with_capacity_unchecked(capacity))
    }

    fn with_capacity_unchecked(capacity: usize) -> Self {
        let windows = SensorType::ALL
            .into_iter()
            .map(|t| (t, VecDeque::with_capacity(capacity)))
            .collect();
        Self { capacity, windows }
    }

    /// Maximum number of samples retained per type.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a sample to the back of the type's window.
    ///
    /// Returns the evicted sample when the window was already full.
    pub fn append(&mut self, sensor_type: SensorType, sample: Sample) -> Option<Sample> {
        let window = self.windows.entry(sensor_type).or_default();
        let evicted = if window.len() >= self.capacity {
            window.pop_front()
        } else {
            None
        };
        window.push_back(sample);
        evicted
    }

    /// The most recently appended sample, or `None` when the window is empty.
    pub fn latest(&self, sensor_type: SensorType) -> Option<Sample> {
        self.windows.get(&sensor_type).and_then(|w| w.back().copied())
    }

    pub fn len(&self, sensor_type: SensorType) -> usize {
        self.windows.get(&sensor_type).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, sensor_type: SensorType) -> bool {
        self.len(sensor_type) == 0
    }

    /// Copy of the type's window, oldest first.
    pub fn snapshot(&self, sensor_type: SensorType) -> Vec<Sample> {
        self.windows
            .get(&sensor_type)
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Copy of every window, keyed by type. Empty windows are included.
    pub fn snapshot_all(&self) -> BTreeMap<SensorType, Vec<Sample>> {
        SensorType::ALL
            .into_iter()
            .map(|t| (t, self.snapshot(t)))
            .collect()
    }

    /// Samples whose `time` lies in `[start, end]` inclusive, in arrival order.
    ///
    /// Linear scan, recomputed on every call.
    pub fn range_filter(
        &self,
        sensor_type: SensorType,
        start: Timestamp,
        end: Timestamp,
    ) -> Vec<Sample> {
        self.windows
            .get(&sensor_type)
            .map(|w| {
                w.iter()
                    .filter(|s| s.time >= start && s.time <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// [`range_filter`](Self::range_filter) applied to every type.
    pub fn range_filter_all(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> BTreeMap<SensorType, Vec<Sample>> {
        SensorType::ALL
            .into_iter()
            .map(|t| (t, self.range_filter(t, start, end)))
            .collect()
    }

    /// Min / max / average / trend over the type's window.
    pub fn stats(&self, sensor_type: SensorType) -> Option<WindowStats> {
        let window = self.windows.get(&sensor_type)?;
        let first = window.front()?.value;
        let last = window.back()?.value;

        let (min, max, sum) = window.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), s| (min.min(s.value), max.max(s.value), sum + s.value),
        );

        Some(WindowStats {
            count: window.len(),
            min,
            max,
            avg: sum / window.len() as f64,
            trend: last - first,
        })
    }
}

impl Default for WindowStore {
    fn default() -> Self {
        Self::with_capacity_unchecked(DEFAULT_WINDOW_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
