use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Common error types used across the queue, the dispatcher and the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller error, e.g. a non-positive task id. Never retried by the queue.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying persistence failure, surfaced verbatim.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Reject non-positive task identifiers before any storage access.
    pub fn check_task_id(id: i64) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "task id must be positive, got {}",
                id
            )));
        }
        Ok(())
    }

    pub fn task_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Message task {} not found", id))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
