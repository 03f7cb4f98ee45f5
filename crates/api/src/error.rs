use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sensorhub_core::error::CoreError;
use sensorhub_core::reading::ReadingError;
use serde_json::json;

use crate::persistence::PersistError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sensorhub_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A submitted reading failed validation.
    #[error(transparent)]
    Reading(#[from] ReadingError),

    /// The persistence collaborator failed on a request that reads from it.
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            AppError::Reading(err) => (StatusCode::BAD_REQUEST, "INVALID_READING", err.to_string()),

            AppError::Persist(err) => {
                tracing::error!(error = %err, "Persistence error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
