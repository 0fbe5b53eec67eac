use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use validator::ValidationErrors;

use todo_domain::TodoError;

use crate::response;

/// Request-surface error: every failure a handler can produce, with its
/// HTTP status. Store detail is logged here and never echoed to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("Todo not found")]
    NotFound,

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error")]
    Internal(String),
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::Validation(msg) => ApiError::BadRequest(msg),
            TodoError::NotFound => ApiError::NotFound,
            TodoError::Timeout => ApiError::Timeout,
            TodoError::Store(detail) => ApiError::Internal(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(detail) => response::error(
                StatusCode::BAD_REQUEST,
                "Invalid request",
                Some(serde_json::Value::String(detail)),
            ),
            ApiError::Validation(errors) => {
                let detail = serde_json::to_value(&errors).ok();
                response::error(StatusCode::BAD_REQUEST, "Validation failed", detail)
            }
            ApiError::NotFound => response::error(StatusCode::NOT_FOUND, "Todo not found", None),
            ApiError::Timeout => {
                response::error(StatusCode::REQUEST_TIMEOUT, "Request timed out", None)
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                response::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        }
    }
}
