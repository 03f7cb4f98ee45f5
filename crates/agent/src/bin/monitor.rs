//! `sensorhub-monitor` -- terminal dashboard for the relay's live feed.
//!
//! Keeps its own sliding windows, evaluates thresholds locally, rings the
//! terminal bell on high-priority alerts, and reports connection loss and
//! recovery as notifications.

use std::process::ExitCode;
use std::sync::Arc;

use sensorhub_agent::config::AgentConfig;
use sensorhub_agent::dashboard::Dashboard;
use sensorhub_agent::monitor;
use sensorhub_agent::reconnect::ReconnectConfig;
use sensorhub_core::reading::SensorType;
use sensorhub_core::window::WindowStore;
use sensorhub_events::{
    AudioCue, ConnectivityMonitor, ConnectivitySignal, NotificationDispatcher, TerminalBell,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorhub_agent=info,sensorhub_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let windows = match WindowStore::new(config.window_capacity) {
        Ok(windows) => windows,
        Err(e) => {
            tracing::error!(error = %e, "Invalid window capacity");
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = Arc::new(NotificationDispatcher::new(
        AudioCue::new(Arc::new(TerminalBell)),
        config.sound_enabled,
    ));
    let display = dispatcher.subscribe(|list| {
        let unread = list.iter().filter(|n| !n.read).count();
        if let Some(newest) = list.first() {
            tracing::info!(unread, priority = ?newest.priority, "{}", newest.message);
        }
    });

    let signal = Arc::new(ConnectivitySignal::new(monitor::INITIAL_LINK_STATE));
    let mut connectivity = ConnectivityMonitor::attach(Arc::clone(&signal), Arc::clone(&dispatcher));

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT (Ctrl-C), stopping");
            ctrl_c_cancel.cancel();
        }
    });

    tracing::info!(ws_url = %config.ws_url, "Starting monitor");
    let mut dashboard = Dashboard::new(windows, config.thresholds, Arc::clone(&dispatcher));
    monitor::run(
        &config.ws_url,
        &mut dashboard,
        &signal,
        &ReconnectConfig::default(),
        &cancel,
    )
    .await;

    connectivity.detach();
    dispatcher.unsubscribe(display);

    for sensor_type in SensorType::ALL {
        if let Some(stats) = dashboard.stats(sensor_type) {
            tracing::info!(
                sensor_type = %sensor_type,
                count = stats.count,
                min = stats.min,
                max = stats.max,
                avg = stats.avg,
                trend = stats.trend,
                "Window summary"
            );
        }
    }
    tracing::info!(
        notifications = dispatcher.notifications().len(),
        unread = dispatcher.unread_count(),
        "Monitor shut down"
    );
    ExitCode::SUCCESS
}
