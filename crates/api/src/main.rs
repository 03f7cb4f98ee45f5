use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensorhub_api::config::ServerConfig;
use sensorhub_api::notifications::NotificationForwarder;
use sensorhub_api::persistence::{MemoryStore, ReadingStore};
use sensorhub_api::router::build_app_router;
use sensorhub_api::state::AppState;
use sensorhub_api::ws;
use sensorhub_core::window::WindowStore;
use sensorhub_events::{
    AudioCue, NotificationDispatcher, NotificationEvent, NotificationType, TerminalBell,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let host: IpAddr = match config.host.parse() {
        Ok(host) => host,
        Err(e) => {
            tracing::error!(host = %config.host, error = %e, "Invalid HOST address");
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

    // --- Broadcast hub ---
    let hub = Arc::new(ws::BroadcastHub::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&hub), ws::HEARTBEAT_INTERVAL);

    // --- Notification dispatcher ---
    let dispatcher = Arc::new(NotificationDispatcher::new(
        AudioCue::new(Arc::new(TerminalBell)),
        config.sound_enabled,
    ));
    let (forwarder_token, forwarder_rx) = NotificationForwarder::subscribe(&dispatcher);
    let forwarder_handle =
        tokio::spawn(NotificationForwarder::new(Arc::clone(&hub)).run(forwarder_rx));
    tracing::info!(sound_enabled = config.sound_enabled, "Notification dispatcher started");

    // --- Persistence ---
    let store: Arc<dyn ReadingStore> = Arc::new(MemoryStore::new(config.persistence_capacity));

    // --- App state ---
    let state = AppState::new(
        config.clone(),
        Arc::clone(&hub),
        Arc::clone(&dispatcher),
        windows,
        store,
    );

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            return ExitCode::FAILURE;
        }
    };

    dispatcher.notify(NotificationEvent::new(
        NotificationType::SystemStatus,
        format!("Relay listening on {addr}"),
    ));

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Dropping the listener closes the channel and ends the forwarder.
    dispatcher.unsubscribe(forwarder_token);
    let _ = tokio::time::timeout(Duration::from_secs(5), forwarder_handle).await;
    tracing::info!("Notification forwarder stopped");

    let ws_count = hub.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    hub.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    match served {
        Ok(()) => {
            tracing::info!("Graceful shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
