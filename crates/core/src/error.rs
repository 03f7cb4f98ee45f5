/// Failures raised by the pure domain modules.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A lookup by id found nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Rejected input, e.g. an inverted threshold or a zero window capacity.
    #[error("Validation failed: {0}")]
    Validation(String),
}
