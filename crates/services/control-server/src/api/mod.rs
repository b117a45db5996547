//! HTTP API for the stream worker control plane.
//!
//! Routes:
//! - `POST /api/start-stream` - spawn a worker for a stream URL
//! - `POST /api/stop-stream` - request termination of a worker by pid
//! - `GET /api/streams` - list live workers
//! - `GET /health` - health check

pub mod streams;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;

use streamgate_core::{WorkerLauncher, WorkerRegistry};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Spawns and signals workers.
    pub launcher: Arc<WorkerLauncher>,

    /// Authoritative map of live workers.
    pub registry: Arc<WorkerRegistry>,
}

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable error code clients can branch on.
    pub error: String,

    /// Human-readable description.
    pub message: String,
}

/// Build the router with all endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/start-stream", post(streams::start_stream))
        .route("/api/stop-stream", post(streams::stop_stream))
        .route("/api/streams", get(streams::list_streams))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower_http::cors::CorsLayer::permissive()),
        )
}

/// Health check endpoint.
async fn health_handler() -> StatusCode {
    StatusCode::OK
}
