//! Serving stored assets back.
//!
//! Both routes take a client-supplied file name. It is parsed into id, role and extension
//! and handed to the store, which resolves it and refuses anything outside the storage
//! root. Missing, expired and escaping references all end up as the same 404.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use upscaler_core::constants::DOWNLOAD_NAME_PREFIX;
use upscaler_core::{AppError, AssetKey, AssetRole};
use upscaler_processing::OutputFormat;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

fn content_type(extension: &str) -> &'static str {
    OutputFormat::from_extension(&extension.to_lowercase())
        .map(OutputFormat::mime_type)
        .unwrap_or("application/octet-stream")
}

async fn load(
    state: &AppState,
    filename: &str,
    role: Option<AssetRole>,
) -> Result<(AssetKey, Vec<u8>), HttpAppError> {
    let key = AssetKey::parse(filename)
        .filter(|key| role.map_or(true, |role| key.role == role))
        .ok_or_else(|| AppError::NotFound(filename.to_string()))?;

    let data = state
        .store
        .read(&key.id, key.role, &key.extension)
        .await?;

    Ok((key, data))
}

fn build_response(
    data: Vec<u8>,
    content_type: &str,
    disposition: String,
) -> Result<Response, HttpAppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(data))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            AppError::Internal(e.to_string()).into()
        })
}

/// Download an upscaled image as an attachment named `upscaled_{filename}`
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "upscale",
    params(
        ("filename" = String, Path, description = "Upscaled file name, e.g. `{id}_upscaled.png`")
    ),
    responses(
        (status = 200, description = "Upscaled image", content_type = "application/octet-stream"),
        (status = 404, description = "File not found or expired", body = ErrorResponse)
    )
)]
pub async fn download_upscaled(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let (key, data) = load(&state, &filename, Some(AssetRole::Derived)).await?;

    tracing::debug!(asset_id = %key.id, size_bytes = data.len(), "Serving download");

    build_response(
        data,
        content_type(&key.extension),
        format!(
            "attachment; filename=\"{}{}\"",
            DOWNLOAD_NAME_PREFIX,
            key.file_name()
        ),
    )
}

/// Serve a stored original or upscaled image inline
#[utoipa::path(
    get,
    path = "/static/uploads/{filename}",
    tag = "upscale",
    params(
        ("filename" = String, Path, description = "Stored file name, e.g. `{id}_original.png`")
    ),
    responses(
        (status = 200, description = "Stored image"),
        (status = 404, description = "File not found or expired", body = ErrorResponse)
    )
)]
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let (key, data) = load(&state, &filename, None).await?;

    build_response(
        data,
        content_type(&key.extension),
        format!("inline; filename=\"{}\"", key.file_name()),
    )
}
