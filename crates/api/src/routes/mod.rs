pub mod health;
pub mod notifications;
pub mod sensors;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sensors/data                       persisted readings (GET, POST)
/// /sensors/windows                    every type's window (GET)
/// /sensors/windows/{type}             one window, optional ?start=&end= (GET)
/// /sensors/thresholds                 current thresholds (GET)
/// /sensors/thresholds/{type}          replace one threshold (PUT)
///
/// /notifications                      list (GET), clear all (DELETE)
/// /notifications/unread-count         unread count (GET)
/// /notifications/read-all             mark all read (POST)
/// /notifications/{id}/read            mark one read (POST)
/// /notifications/sound                sound flag (GET, PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sensors", sensors::router())
        .nest("/notifications", notifications::router())
}

/// WebSocket endpoints. Mounted at `/` for plain `ws://host:port` clients
/// and at `/ws`.
pub fn live_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ws::ws_handler))
        .route("/ws", get(ws::ws_handler))
}
