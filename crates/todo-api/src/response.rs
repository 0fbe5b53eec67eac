use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success half of the uniform response envelope.
#[derive(Debug, Serialize)]
pub struct SuccessBody<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Error half of the uniform response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    success(StatusCode::OK, message, Some(data))
}

pub fn ok_empty(message: &str) -> Response {
    success::<()>(StatusCode::OK, message, None)
}

pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    success(StatusCode::CREATED, message, Some(data))
}

pub fn error(status: StatusCode, message: &str, detail: Option<serde_json::Value>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            message: message.to_string(),
            error: detail,
        }),
    )
        .into_response()
}

fn success<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    (
        status,
        Json(SuccessBody {
            success: true,
            message: message.to_string(),
            data,
        }),
    )
        .into_response()
}
