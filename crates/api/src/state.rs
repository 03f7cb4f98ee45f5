use std::sync::{Arc, RwLock};

use sensorhub_core::thresholds::ThresholdConfig;
use sensorhub_core::window::WindowStore;
use sensorhub_events::NotificationDispatcher;

use crate::config::ServerConfig;
use crate::persistence::ReadingStore;
use crate::relay::Relay;
use crate::ws::BroadcastHub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Live subscriber connections.
    pub hub: Arc<BroadcastHub>,
    /// Arrival path shared by every ingest connection.
    pub relay: Relay,
    /// The one notification dispatcher of this process.
    pub dispatcher: Arc<NotificationDispatcher>,
    pub windows: Arc<RwLock<WindowStore>>,
    pub thresholds: Arc<RwLock<ThresholdConfig>>,
    pub store: Arc<dyn ReadingStore>,
}

impl AppState {
    /// Wire the relay over the given components.
    pub fn new(
        config: ServerConfig,
        hub: Arc<BroadcastHub>,
        dispatcher: Arc<NotificationDispatcher>,
        windows: WindowStore,
        store: Arc<dyn ReadingStore>,
    ) -> Self {
        let windows = Arc::new(RwLock::new(windows));
        let thresholds = Arc::new(RwLock::new(config.thresholds.clone()));
        let relay = Relay::new(
            Arc::clone(&hub),
            Arc::clone(&dispatcher),
            Arc::clone(&windows),
            Arc::clone(&thresholds),
            Arc::clone(&store),
        );

        Self {
            config: Arc::new(config),
            hub,
            relay,
            dispatcher,
            windows,
            thresholds,
            store,
        }
    }
}
