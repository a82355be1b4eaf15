use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use upscaler_core::constants::{DOWNLOAD_PATH, STATIC_UPLOADS_PATH};
use upscaler_core::{AppError, ScaleFactor, UpscaleOutcome, UpscaleRequest};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Successful upload: where both assets live and how big they are
#[derive(Debug, Serialize, ToSchema)]
pub struct UpscaleResponse {
    pub success: bool,
    /// Identifier shared by the original and the upscaled file
    pub id: String,
    pub original_url: String,
    pub upscaled_url: String,
    pub original_size: u64,
    pub upscaled_size: u64,
    /// `[width, height]`
    #[schema(value_type = Vec<u32>)]
    pub original_dimensions: (u32, u32),
    /// `[width, height]`
    #[schema(value_type = Vec<u32>)]
    pub upscaled_dimensions: (u32, u32),
    pub scale_factor: f64,
    pub download_url: String,
}

impl From<UpscaleOutcome> for UpscaleResponse {
    fn from(outcome: UpscaleOutcome) -> Self {
        let original_name = outcome.original.file_name();
        let derived_name = outcome.derived.file_name();

        Self {
            success: true,
            id: outcome.original.id.to_string(),
            original_url: format!("{}/{}", STATIC_UPLOADS_PATH, original_name),
            upscaled_url: format!("{}/{}", STATIC_UPLOADS_PATH, derived_name),
            original_size: outcome.original_size,
            upscaled_size: outcome.upscaled_size,
            original_dimensions: outcome.original_dimensions,
            upscaled_dimensions: outcome.upscaled_dimensions,
            scale_factor: outcome.scale.get(),
            download_url: format!("{}/{}", DOWNLOAD_PATH, derived_name),
        }
    }
}

/// File and form fields pulled out of the multipart body
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    scale_factor: Option<String>,
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { max_bytes }
    } else {
        AppError::InvalidInput(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        file: None,
        scale_factor: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if form.file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;
                form.file = Some((file_name, data.to_vec()));
            }
            "scale_factor" => {
                let value = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
                form.scale_factor = Some(value);
            }
            // Unknown fields are drained and ignored.
            _ => {}
        }
    }

    Ok(form)
}

/// Upload an image and upscale it
///
/// Multipart fields: `file` (required) and `scale_factor` (optional, default 2,
/// must be in `(0, 10]`). Both the original and the upscaled image are stored under a
/// freshly generated id and expire after the retention window.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upscale",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image upscaled", body = UpscaleResponse),
        (status = 400, description = "Missing file, bad extension, bad scale factor or corrupt image", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing or storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UpscaleResponse>, HttpAppError> {
    let max_bytes = state.config.storage.max_content_length;

    // Refuse oversized requests before reading the body.
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_length.is_some_and(|len| len > max_bytes) {
        return Err(AppError::PayloadTooLarge { max_bytes }.into());
    }

    let multipart = multipart.map_err(|_| {
        AppError::MissingFile("Missing file field (name must be 'file')".to_string())
    })?;
    let form = read_form(multipart, max_bytes).await?;

    let (file_name, data) = form.file.ok_or_else(|| {
        AppError::MissingFile("Missing file field (name must be 'file')".to_string())
    })?;
    if file_name.is_empty() {
        return Err(AppError::MissingFile("No file selected".to_string()).into());
    }

    let scale = ScaleFactor::parse(form.scale_factor.as_deref())?;

    let outcome = state
        .upscale
        .upscale(UpscaleRequest {
            data,
            file_name,
            scale,
        })
        .await?;

    Ok(Json(UpscaleResponse::from(outcome)))
}
