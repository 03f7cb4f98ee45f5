//! The arrival path for one reading.
//!
//! Order per reading: validate, broadcast to every live connection, evaluate
//! thresholds against the configuration as it is right now, raise an alert
//! if breached, append to the window, and finally hand the reading to the
//! persistence task without waiting for it.

use std::sync::{Arc, PoisonError, RwLock};

use sensorhub_core::reading::{parse_reading, Reading, ReadingError};
use sensorhub_core::thresholds::{check_reading, ThresholdBreach, ThresholdConfig};
use sensorhub_core::window::WindowStore;
use sensorhub_events::{NotificationDispatcher, NotificationEvent};
use tokio::task::JoinHandle;

use crate::persistence::{persist_in_background, ReadingStore};
use crate::ws::BroadcastHub;

/// What happened to one accepted reading.
#[derive(Debug)]
pub struct Relayed {
    pub reading: Reading,
    /// Connections the reading was queued for.
    pub delivered: usize,
    pub breach: Option<ThresholdBreach>,
    /// The detached persistence write. The relay never awaits it.
    pub persist: JoinHandle<()>,
}

#[derive(Clone)]
pub struct Relay {
    hub: Arc<BroadcastHub>,
    dispatcher: Arc<NotificationDispatcher>,
    windows: Arc<RwLock<WindowStore>>,
    thresholds: Arc<RwLock<ThresholdConfig>>,
    store: Arc<dyn ReadingStore>,
}

impl Relay {
    pub fn new(
        hub: Arc<BroadcastHub>,
        dispatcher: Arc<NotificationDispatcher>,
        windows: Arc<RwLock<WindowStore>>,
        thresholds: Arc<RwLock<ThresholdConfig>>,
        store: Arc<dyn ReadingStore>,
    ) -> Self {
        Self {
            hub,
            dispatcher,
            windows,
            thresholds,
            store,
        }
    }

    /// Validate a raw inbound message and relay it.
    pub async fn ingest(&self, raw: &str) -> Result<Relayed, ReadingError> {
        let reading = parse_reading(raw)?;
        Ok(self.relay(reading).await)
    }

    /// Relay an already validated reading.
    pub async fn relay(&self, reading: Reading) -> Relayed {
        let delivered = match self.hub.broadcast(&reading).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, sensor_id = %reading.sensor_id, "Failed to encode reading");
                0
            }
        };

        let breach = {
            let thresholds = self.thresholds.read().unwrap_or_else(PoisonError::into_inner);
            check_reading(&reading, &thresholds)
        };
        if let Some(breach) = &breach {
            self.dispatcher.notify(NotificationEvent::threshold_alert(breach));
        }

        self.windows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .append(reading.sensor_type, reading.sample());

        tracing::debug!(
            sensor_id = %reading.sensor_id,
            sensor_type = %reading.sensor_type,
            value = reading.value,
            delivered,
            "Reading relayed"
        );

        let persist = persist_in_background(Arc::clone(&self.store), reading.clone());

        Relayed {
            reading,
            delivered,
            breach,
            persist,
        }
    }
}
