//! `sensorhub-agent` -- sensor simulator.
//!
//! Generates one reading from a random simulated sensor per tick and
//! pushes it to the relay over WebSocket.
//!
//! # Environment variables
//!
//! | Variable                | Default                  |
//! |-------------------------|--------------------------|
//! | `RELAY_WS_URL`          | `ws://localhost:5000/ws` |
//! | `SIMULATOR_INTERVAL_MS` | `2000`                   |

use std::process::ExitCode;

use sensorhub_agent::config::AgentConfig;
use sensorhub_agent::sender;
use sensorhub_agent::simulator::SensorSimulator;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorhub_agent=info".into()),
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

    let simulator = SensorSimulator::default();
    tracing::info!(
        ws_url = %config.ws_url,
        interval_ms = config.interval.as_millis() as u64,
        sensors = simulator.sensors().len(),
        "Starting sensor simulator",
    );

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT (Ctrl-C), stopping");
            ctrl_c_cancel.cancel();
        }
    });

    sender::run(&config.ws_url, config.interval, &simulator, &cancel).await;
    ExitCode::SUCCESS
}
