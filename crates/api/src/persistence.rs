//! Best-effort durable storage of readings.
//!
//! The relay never awaits a write: [`persist_in_background`] hands the
//! reading to a detached task whose only reaction to failure is a log line.
//! The HTTP surface (`GET`/`POST /api/sensors/data`) is the one place that
//! talks to the store directly.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use sensorhub_core::reading::Reading;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// How many readings `GET /api/sensors/data` returns.
pub const RECENT_READINGS_LIMIT: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage rejected reading: {0}")]
    Rejected(String),
}

/// Durable storage collaborator for readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Store one reading.
    async fn save(&self, reading: &Reading) -> Result<(), PersistError>;

    /// Up to `limit` readings with the latest timestamps, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<Reading>, PersistError>;
}

/// In-process store keeping the newest `capacity` readings by timestamp.
///
/// Kept sorted on `time`, newest first; a late save of an older reading
/// lands in its place rather than at the head.
pub struct MemoryStore {
    capacity: usize,
    readings: RwLock<VecDeque<Reading>>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            readings: RwLock::new(VecDeque::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn save(&self, reading: &Reading) -> Result<(), PersistError> {
        if self.capacity == 0 {
            return Err(PersistError::Unavailable("store capacity is zero".into()));
        }
        let mut readings = self.readings.write().await;
        let at = readings.partition_point(|r| r.time > reading.time);
        readings.insert(at, reading.clone());
        readings.truncate(self.capacity);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Reading>, PersistError> {
        Ok(self
            .readings
            .read()
            .await
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Issue a save on its own task and return immediately.
///
/// The outcome is logged, never reported to the caller. The handle is only
/// returned so tests can wait for the write.
pub fn persist_in_background(store: Arc<dyn ReadingStore>, reading: Reading) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.save(&reading).await {
            Ok(()) => tracing::trace!(sensor_id = %reading.sensor_id, "Reading persisted"),
            Err(e) => tracing::error!(
                error = %e,
                sensor_id = %reading.sensor_id,
                sensor_type = %reading.sensor_type,
                "Failed to persist reading"
            ),
        }
    })
}
