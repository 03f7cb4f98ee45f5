#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sensorhub_api::config::ServerConfig;
use sensorhub_api::persistence::{MemoryStore, PersistError, ReadingStore};
use sensorhub_api::router::build_app_router;
use sensorhub_api::state::AppState;
use sensorhub_api::ws::BroadcastHub;
use sensorhub_core::reading::Reading;
use sensorhub_core::window::WindowStore;
use sensorhub_events::{AudioCue, AudioError, CueSink, NotificationDispatcher};
use serde_json::Value;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        ..ServerConfig::default()
    }
}

/// Counts cue starts instead of making noise.
#[derive(Default)]
pub struct CountingSink {
    starts: AtomicUsize,
}

impl CountingSink {
    pub fn count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl CueSink for CountingSink {
    fn start(&self, _duration: Duration) -> Result<(), AudioError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A persistence collaborator that fails every call.
pub struct FailingStore {
    pub attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReadingStore for FailingStore {
    async fn save(&self, _reading: &Reading) -> Result<(), PersistError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PersistError::Unavailable("database is down".into()))
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<Reading>, PersistError> {
        Err(PersistError::Unavailable("database is down".into()))
    }
}

/// Application state plus the sound sink behind its dispatcher.
pub struct TestState {
    pub state: AppState,
    pub sink: Arc<CountingSink>,
}

/// Build isolated application state over `store`.
pub fn build_test_state_with_store(store: Arc<dyn ReadingStore>) -> TestState {
    let config = test_config();
    let sink = Arc::new(CountingSink::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        AudioCue::new(sink.clone()).with_duration(Duration::from_secs(60)),
        config.sound_enabled,
    ));
    let windows = WindowStore::new(config.window_capacity).unwrap();

    let state = AppState::new(
        config,
        Arc::new(BroadcastHub::new()),
        dispatcher,
        windows,
        store,
    );
    TestState { state, sink }
}

pub fn build_test_state() -> TestState {
    build_test_state_with_store(Arc::new(MemoryStore::new(1000)))
}

/// Build the full application router with all middleware layers.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// production middleware stack.
pub fn build_test_app() -> (Router, AppState) {
    let TestState { state, .. } = build_test_state();
    let app = build_app_router(state.clone(), &test_config());
    (app, state)
}

pub fn router_for(state: &AppState) -> Router {
    build_app_router(state.clone(), &test_config())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
