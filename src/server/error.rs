use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::error::CoviscopeError;

/// Unified error type that renders as a JSON `{"error": "..."}` response
/// with an appropriate HTTP status code.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Client errors carry their message back to the caller. Server errors are
/// logged with their cause and replaced by a generic message.
impl From<CoviscopeError> for AppError {
    fn from(e: CoviscopeError) -> Self {
        match e {
            CoviscopeError::MalformedRequest(msg) | CoviscopeError::Validation(msg) => {
                tracing::debug!(error = %msg, "rejected chart request");
                AppError::bad_request(msg)
            }
            CoviscopeError::Connectivity(_) => {
                tracing::error!(error = %e, "database connection error");
                AppError::internal("Database connection error")
            }
            other => {
                tracing::error!(error = %other, "failed to fetch data");
                AppError::internal("Error fetching data")
            }
        }
    }
}
