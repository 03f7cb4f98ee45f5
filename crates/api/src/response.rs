use serde::Serialize;

/// Body of every successful JSON response: `{ "data": T }`.
///
/// Errors use the `{ "error", "code" }` shape from
/// [`AppError`](crate::error::AppError) instead.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
