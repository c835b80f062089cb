use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use xcpview_core::CoreError;

// ==============================================================================
// Error Type
// ==============================================================================

pub(crate) const NOT_FOUND_BODY: &str = "404 Not Found";
pub(crate) const INTERNAL_BODY: &str = "500 Internal Server Error";

pub(crate) enum AppError {
    /// The primary entity of the request does not exist.
    NotFound,
    Internal(CoreError),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_BODY),
            Self::Internal(err) => {
                // Database details stay in the log.
                tracing::error!(error = %err, "ledger query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_BODY)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
