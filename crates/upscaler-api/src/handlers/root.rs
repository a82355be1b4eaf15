use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::state::AppState;

/// Redirect to the frontend when one is configured, otherwise report liveness
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Backend is running"),
        (status = 302, description = "Redirect to the configured frontend")
    )
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Response {
    match state.config.server.frontend_url.as_deref() {
        Some(url) => (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response(),
        None => Json(serde_json::json!({
            "status": "ok",
            "message": "Image Upscaler backend running"
        }))
        .into_response(),
    }
}

/// Liveness probe - process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
