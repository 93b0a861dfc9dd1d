//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub bucket: String,
    pub version: &'static str,
}

/// Process is up and the storage backend is configured. Does not call out
/// to the backend.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = &state.media.storage;
    (
        StatusCode::OK,
        Json(HealthCheckResponse {
            status: "healthy".to_string(),
            storage: storage.backend_type().to_string(),
            bucket: storage.default_bucket().to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}
