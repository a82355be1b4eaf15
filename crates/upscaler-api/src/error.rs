//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Every crate error converts
//! into `HttpAppError` through `AppError`, so status codes, bodies and logging stay in one
//! place.
//!
//! The rendered body never carries details. For non-sensitive errors the detailed body
//! rides along as a response extension; `middleware::error_details` swaps it in when the
//! configuration allows it.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use upscaler_core::{AppError, ErrorMetadata, LogLevel, ScaleFactorError};
use upscaler_processing::{TransformError, ValidationError};
use upscaler_services::PipelineError;
use upscaler_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Upload limit, only on 413 responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<usize>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        let max_bytes = match error {
            AppError::PayloadTooLarge { max_bytes } => Some(*max_bytes),
            _ => None,
        };

        Self {
            success: false,
            error: error.client_message(),
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
            max_bytes,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Error body including internal details, attached to non-sensitive error responses
#[derive(Debug, Clone)]
pub struct DetailedErrorBody(pub ErrorResponse);

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                details = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, false);
        let mut response = (status, Json(body)).into_response();

        // Sensitive errors never carry details.
        if !app_error.is_sensitive() {
            response
                .extensions_mut()
                .insert(DetailedErrorBody(ErrorResponse::from_app_error(app_error, true)));
        }

        response
    }
}

/// Render a panic caught at the HTTP boundary as a generic 500.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    HttpAppError(AppError::Internal(format!("handler panicked: {}", message))).into_response()
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)
impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::EmptyFilename => AppError::MissingFile("No file selected".to_string()),
            ValidationError::UnsupportedFormat { extension, allowed } => {
                AppError::UnsupportedFormat { extension, allowed }
            }
            ValidationError::FileTooLarge { max, .. } => AppError::PayloadTooLarge { max_bytes: max },
            ValidationError::CorruptImage(msg) => AppError::CorruptImage(msg),
        };
        HttpAppError(app)
    }
}

impl From<TransformError> for HttpAppError {
    fn from(err: TransformError) -> Self {
        let app = match err {
            TransformError::OutputTooLarge {
                width,
                height,
                max_pixels,
            } => AppError::OutputTooLarge {
                width,
                height,
                max_pixels,
            },
            other => AppError::Processing(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => e.into(),
            PipelineError::Transform(e) => e.into(),
            PipelineError::Storage(e) => e.into(),
            PipelineError::Internal(msg) => HttpAppError(AppError::Internal(msg)),
        }
    }
}

impl From<ScaleFactorError> for HttpAppError {
    fn from(err: ScaleFactorError) -> Self {
        HttpAppError(AppError::InvalidScaleFactor(err.to_string()))
    }
}
