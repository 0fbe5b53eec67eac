//! HTTP API for managing todo items.
//!
//! Layering: handlers decode and validate input, `TodoService` applies
//! the business rules, `TodoRepository` talks to the store. Each layer
//! translates errors into its own vocabulary on the way back up.

use axum::routing::{get, patch};
use axum::Router;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod response;
pub mod service;

use service::TodoService;

/// Shared per-request state.
#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
}

/// Builds the router. The timeout layer enforces the per-request
/// deadline; when it fires, the handler future is dropped (cancelling any
/// in-flight store call) and the client gets a 408.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let todos = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/:id",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route("/todos/:id/toggle", patch(handlers::toggle_todo));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", todos)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        // A panicking handler becomes a 500; the process stays up.
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
