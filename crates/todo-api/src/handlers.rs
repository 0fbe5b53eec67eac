use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use todo_domain::{CreateTodoRequest, UpdateTodoRequest};

use crate::error::ApiError;
use crate::response;
use crate::AppState;

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Todo API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

/// POST /api/v1/todos
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    req.validate().map_err(ApiError::Validation)?;

    let todo = state.service.create(req).await?;
    Ok(response::created("Todo created successfully", todo))
}

/// GET /api/v1/todos/:id
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.service.get_by_id(id).await?;
    Ok(response::ok("Todo retrieved successfully", todo))
}

/// GET /api/v1/todos
///
/// Unparseable `page`/`per_page` values fall back to their defaults
/// instead of failing the request; the service applies the final clamp.
pub async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let page = int_param(&params, "page", 1);
    let per_page = int_param(&params, "per_page", 20);

    let list = state.service.get_all(page, per_page).await?;
    Ok(response::ok("Todos retrieved successfully", list))
}

/// PUT /api/v1/todos/:id
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    req.validate().map_err(ApiError::Validation)?;

    let todo = state.service.update(id, req).await?;
    Ok(response::ok("Todo updated successfully", todo))
}

/// DELETE /api/v1/todos/:id
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(response::ok_empty("Todo deleted successfully"))
}

/// PATCH /api/v1/todos/:id/toggle
pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.service.toggle(id).await?;
    Ok(response::ok("Todo toggled successfully", todo))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid todo id: {raw}")))
}

fn int_param(params: &HashMap<String, String>, key: &str, default: i64) -> i64 {
    params
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
