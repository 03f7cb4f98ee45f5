//! Handlers for the `/sensors` resource: live windows, thresholds, and the
//! persisted-reading surface.

use std::sync::PoisonError;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use sensorhub_core::reading::{reading_from_value, Reading, SensorType};
use sensorhub_core::thresholds::{Threshold, ThresholdConfig};
use sensorhub_core::window::{Sample, WindowStats, WindowStore};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::persistence::RECENT_READINGS_LIMIT;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

/// Optional inclusive time range for `GET /sensors/windows/{type}`.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Body of `PUT /sensors/thresholds/{type}`.
#[derive(Debug, Deserialize)]
pub struct UpdateThreshold {
    pub min: f64,
    pub max: f64,
}

/// Read-only view of one sensor type's window.
#[derive(Debug, Serialize)]
pub struct WindowView {
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub capacity: usize,
    pub latest: Option<Sample>,
    pub samples: Vec<Sample>,
    pub stats: Option<WindowStats>,
}

impl WindowView {
    fn of(store: &WindowStore, sensor_type: SensorType, samples: Vec<Sample>) -> Self {
        Self {
            sensor_type,
            capacity: store.capacity(),
            latest: store.latest(sensor_type),
            samples,
            stats: store.stats(sensor_type),
        }
    }
}

fn parse_type(raw: &str) -> AppResult<SensorType> {
    Ok(raw.parse::<SensorType>()?)
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// GET /api/sensors/windows
pub async fn list_windows(State(state): State<AppState>) -> Json<DataResponse<Vec<WindowView>>> {
    let store = state.windows.read().unwrap_or_else(PoisonError::into_inner);
    let views = SensorType::ALL
        .into_iter()
        .map(|t| WindowView::of(&store, t, store.snapshot(t)))
        .collect();
    Json(DataResponse { data: views })
}

/// GET /api/sensors/windows/{type}?start=&end=
///
/// Without a range the whole window is returned. A missing bound is open.
pub async fn get_window(
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
    Query(range): Query<RangeQuery>,
) -> AppResult<Json<DataResponse<WindowView>>> {
    let sensor_type = parse_type(&raw_type)?;

    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            return Err(AppError::BadRequest("start must not be after end".into()));
        }
    }

    let store = state.windows.read().unwrap_or_else(PoisonError::into_inner);
    let samples = if range.start.is_none() && range.end.is_none() {
        store.snapshot(sensor_type)
    } else {
        store.range_filter(
            sensor_type,
            range.start.unwrap_or(DateTime::<Utc>::MIN_UTC),
            range.end.unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    };

    Ok(Json(DataResponse {
        data: WindowView::of(&store, sensor_type, samples),
    }))
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// GET /api/sensors/thresholds
pub async fn list_thresholds(State(state): State<AppState>) -> Json<DataResponse<ThresholdConfig>> {
    let thresholds = state
        .thresholds
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Json(DataResponse { data: thresholds })
}

/// PUT /api/sensors/thresholds/{type}
///
/// Applies from the next reading on.
pub async fn update_threshold(
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
    Json(input): Json<UpdateThreshold>,
) -> AppResult<Json<DataResponse<Threshold>>> {
    let sensor_type = parse_type(&raw_type)?;
    let threshold = Threshold::new(input.min, input.max)?;

    state
        .thresholds
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .set(sensor_type, threshold);

    tracing::info!(
        sensor_type = %sensor_type,
        min = threshold.min,
        max = threshold.max,
        "Threshold updated"
    );
    Ok(Json(DataResponse { data: threshold }))
}

// ---------------------------------------------------------------------------
// Persisted readings
// ---------------------------------------------------------------------------

/// GET /api/sensors/data
///
/// The most recent persisted readings, newest first.
pub async fn list_readings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Reading>>>> {
    let readings = state.store.recent(RECENT_READINGS_LIMIT).await?;
    Ok(Json(DataResponse { data: readings }))
}

/// POST /api/sensors/data
///
/// Validates and stores one reading. Does not broadcast.
pub async fn create_reading(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<DataResponse<Reading>>)> {
    let reading = reading_from_value(body, Utc::now())?;
    state.store.save(&reading).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: reading })))
}
