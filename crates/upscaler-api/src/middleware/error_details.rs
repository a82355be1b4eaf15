use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use upscaler_core::Config;

use crate::error::DetailedErrorBody;

/// Whether error responses may include internal details
#[derive(Clone, Copy, Debug)]
pub struct ErrorDetailsConfig {
    pub expose_details: bool,
}

impl ErrorDetailsConfig {
    /// Details are shown everywhere except production.
    pub fn from_config(config: &Config) -> Self {
        Self {
            expose_details: !config.is_production(),
        }
    }
}

/// Error details middleware
/// Replaces an error body with its detailed form unless details are hidden
pub async fn error_details_middleware(
    State(config): State<ErrorDetailsConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(DetailedErrorBody(detailed)) = response.extensions_mut().remove::<DetailedErrorBody>()
    else {
        return response;
    };

    if !config.expose_details {
        return response;
    }

    let status = response.status();
    let mut detailed_response = Json(detailed).into_response();
    *detailed_response.status_mut() = status;
    detailed_response
}
