//! Integration tests for the consumer-side dashboard and monitor loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use futures::SinkExt;
use sensorhub_agent::dashboard::{Dashboard, Inbound};
use sensorhub_agent::monitor;
use sensorhub_agent::reconnect::ReconnectConfig;
use sensorhub_core::reading::SensorType;
use sensorhub_core::thresholds::{Direction, ThresholdConfig};
use sensorhub_core::window::WindowStore;
use sensorhub_events::{
    AudioCue, AudioError, ConnectivityMonitor, ConnectivitySignal, CueSink, LinkState,
    NotificationDispatcher, NotificationType, Priority,
};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CountingSink(AtomicUsize);

impl CueSink for CountingSink {
    fn start(&self, _duration: Duration) -> Result<(), AudioError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn dashboard() -> (Dashboard, Arc<NotificationDispatcher>, Arc<CountingSink>) {
    let sink = Arc::new(CountingSink::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        AudioCue::new(sink.clone()).with_duration(Duration::from_secs(60)),
        true,
    ));
    let dashboard = Dashboard::new(
        WindowStore::new(3).unwrap(),
        ThresholdConfig::default(),
        Arc::clone(&dispatcher),
    );
    (dashboard, dispatcher, sink)
}

fn reading(sensor_type: &str, value: f64) -> String {
    json!({"sensorId": "S1", "type": sensor_type, "value": value, "unit": "u"}).to_string()
}

// ---------------------------------------------------------------------------
// Test: Greeting and notification snapshots are not readings
// ---------------------------------------------------------------------------

#[test]
fn non_sensor_records_are_recognised() {
    let (mut dashboard, dispatcher, _) = dashboard();

    let greeting = json!({"type": "connection", "message": "Connected to WebSocket server"});
    assert_eq!(
        dashboard.handle_text(&greeting.to_string()),
        Inbound::Greeting("Connected to WebSocket server".into())
    );

    let snapshot = json!({"type": "notifications", "data": [{"id": 1}, {"id": 2}]});
    assert_eq!(
        dashboard.handle_text(&snapshot.to_string()),
        Inbound::Notifications(2)
    );

    assert_eq!(dashboard.handle_text("garbage"), Inbound::Ignored);
    assert_eq!(
        dashboard.handle_text(r#"{"sensorId":"S1","type":"temperature"}"#),
        Inbound::Ignored
    );

    assert!(SensorType::ALL
        .iter()
        .all(|t| dashboard.windows().is_empty(*t)));
    assert!(dispatcher.notifications().is_empty());
}

// ---------------------------------------------------------------------------
// Test: Readings fill the local window FIFO
// ---------------------------------------------------------------------------

#[test]
fn readings_fill_the_window_fifo() {
    let (mut dashboard, _, _) = dashboard();

    for value in [21.0, 22.0, 23.0, 24.0] {
        assert_matches!(
            dashboard.handle_text(&reading("temperature", value)),
            Inbound::Reading { breach: None, .. }
        );
    }

    let values: Vec<f64> = dashboard
        .windows()
        .snapshot(SensorType::Temperature)
        .iter()
        .map(|s| s.value)
        .collect();
    assert_eq!(values, vec![22.0, 23.0, 24.0]);

    let stats = dashboard.stats(SensorType::Temperature).unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.trend, 2.0);
}

// ---------------------------------------------------------------------------
// Test: Local threshold breaches raise alerts with one cue
// ---------------------------------------------------------------------------

#[test]
fn breaches_raise_alerts() {
    let (mut dashboard, dispatcher, sink) = dashboard();

    let inbound = dashboard.handle_text(&reading("humidity", 90.0));
    assert_matches!(
        inbound,
        Inbound::Reading { breach: Some(ref b), .. } if b.direction == Direction::High
    );
    dashboard.handle_text(&reading("pressure", 950.0));

    let list = dispatcher.notifications();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].message, "pressure is too low: 950 u");
    assert_eq!(list[1].message, "humidity is too high: 90 u");
    assert!(list.iter().all(|n| n.kind == NotificationType::ThresholdAlert));
    assert!(list.iter().all(|n| n.priority == Priority::High));
    assert_eq!(sink.0.load(Ordering::SeqCst), 1);
}

fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        initial_delay: Duration::from_millis(50),
        ..ReconnectConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Test: Monitor loop reports the link coming up and going down
// ---------------------------------------------------------------------------

#[tokio::test]
async fn monitor_reports_connection_loss() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::Text(
            json!({"type": "connection", "message": "Connected to WebSocket server"}).to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text(reading("temperature", 35.0)))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
    });

    let (mut dashboard, dispatcher, _) = dashboard();
    let signal = Arc::new(ConnectivitySignal::new(monitor::INITIAL_LINK_STATE));
    let mut connectivity = ConnectivityMonitor::attach(Arc::clone(&signal), Arc::clone(&dispatcher));

    let cancel = CancellationToken::new();
    let watcher_cancel = cancel.clone();
    let watcher_dispatcher = Arc::clone(&dispatcher);
    tokio::spawn(async move {
        while !watcher_dispatcher
            .notifications()
            .iter()
            .any(|n| n.message == "Connection lost")
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        watcher_cancel.cancel();
    });

    tokio::time::timeout(
        Duration::from_secs(5),
        monitor::run(
            &format!("ws://{addr}"),
            &mut dashboard,
            &signal,
            &fast_reconnect(),
            &cancel,
        ),
    )
    .await
    .expect("monitor should stop once cancelled");

    connectivity.detach();

    assert_eq!(signal.state(), LinkState::Down);
    assert_eq!(dashboard.windows().len(SensorType::Temperature), 1);
    let messages: Vec<String> = dispatcher
        .notifications()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Connection lost",
            "temperature is too high: 35 u",
            "Connection restored",
        ]
    );
}

// ---------------------------------------------------------------------------
// Test: An unreachable relay at startup is not reported as a lost link
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_first_connect_raises_no_notification() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let (mut dashboard, dispatcher, _) = dashboard();
    let signal = Arc::new(ConnectivitySignal::new(monitor::INITIAL_LINK_STATE));
    let mut connectivity = ConnectivityMonitor::attach(Arc::clone(&signal), Arc::clone(&dispatcher));

    let cancel = CancellationToken::new();
    let timer_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        timer_cancel.cancel();
    });

    tokio::time::timeout(
        Duration::from_secs(5),
        monitor::run(
            &format!("ws://{addr}"),
            &mut dashboard,
            &signal,
            &fast_reconnect(),
            &cancel,
        ),
    )
    .await
    .expect("monitor should stop once cancelled");

    connectivity.detach();

    assert_eq!(signal.state(), LinkState::Down);
    assert!(dispatcher.notifications().is_empty());
}
