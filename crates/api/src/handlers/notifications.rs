//! Handlers for the `/notifications` resource.
//!
//! Every mutation goes through the dispatcher, so live observers receive
//! the new snapshot over the WebSocket as a side effect.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sensorhub_core::error::CoreError;
use sensorhub_events::{Notification, NotificationId};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SoundSetting {
    pub enabled: bool,
}

/// GET /api/notifications
///
/// The full list, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<Notification>>> {
    Json(DataResponse {
        data: state.dispatcher.notifications(),
    })
}

/// GET /api/notifications/unread-count
pub async fn unread_count(State(state): State<AppState>) -> Json<DataResponse<UnreadCount>> {
    Json(DataResponse {
        data: UnreadCount {
            count: state.dispatcher.unread_count(),
        },
    })
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> AppResult<StatusCode> {
    if !state.dispatcher.mark_as_read(id) {
        return Err(CoreError::NotFound {
            entity: "Notification",
            id: id.to_string(),
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(State(state): State<AppState>) -> StatusCode {
    state.dispatcher.mark_all_as_read();
    StatusCode::NO_CONTENT
}

/// DELETE /api/notifications
pub async fn clear_all(State(state): State<AppState>) -> StatusCode {
    state.dispatcher.clear_all();
    StatusCode::NO_CONTENT
}

/// GET /api/notifications/sound
pub async fn get_sound(State(state): State<AppState>) -> Json<DataResponse<SoundSetting>> {
    Json(DataResponse {
        data: SoundSetting {
            enabled: state.dispatcher.sound_enabled(),
        },
    })
}

/// PUT /api/notifications/sound
pub async fn set_sound(
    State(state): State<AppState>,
    Json(input): Json<SoundSetting>,
) -> Json<DataResponse<SoundSetting>> {
    state.dispatcher.set_sound_enabled(input.enabled);
    tracing::info!(enabled = input.enabled, "Notification sound toggled");
    Json(DataResponse { data: input })
}
