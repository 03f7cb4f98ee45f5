//! Route definitions for the `/sensors` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::sensors;
use crate::state::AppState;

/// Routes mounted at `/sensors`.
///
/// ```text
/// GET    /data                 -> list_readings
/// POST   /data                 -> create_reading
/// GET    /windows              -> list_windows
/// GET    /windows/{type}       -> get_window
/// GET    /thresholds           -> list_thresholds
/// PUT    /thresholds/{type}    -> update_threshold
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/data",
            get(sensors::list_readings).post(sensors::create_reading),
        )
        .route("/windows", get(sensors::list_windows))
        .route("/windows/{type}", get(sensors::get_window))
        .route("/thresholds", get(sensors::list_thresholds))
        .route("/thresholds/{type}", put(sensors::update_threshold))
}
