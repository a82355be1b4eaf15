//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use upscaler_core::Config;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::middleware::{error_details_middleware, ErrorDetailsConfig};
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .route("/upload", post(handlers::upload::upload_image))
        .route(
            "/download/{*filename}",
            get(handlers::download::download_upscaled),
        )
        .route(
            "/static/uploads/{*filename}",
            get(handlers::download::serve_asset),
        )
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(DefaultBodyLimit::max(config.storage.max_content_length))
        .layer(axum::middleware::from_fn_with_state(
            ErrorDetailsConfig::from_config(config),
            error_details_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(crate::error::panic_response))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
///
/// A configured frontend URL is always allowed. `*` only applies when no frontend is set.
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let explicit: Vec<&str> = config
        .server
        .frontend_url
        .iter()
        .map(|url| url.trim_end_matches('/'))
        .chain(
            config
                .server
                .cors_origins
                .iter()
                .map(String::as_str)
                .filter(|origin| *origin != "*"),
        )
        .collect();

    let allow_any =
        config.server.frontend_url.is_none() && config.server.cors_origins.iter().any(|o| o == "*");

    let cors = if allow_any {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = explicit
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(origins = ?explicit, "CORS restricted to configured origins");

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };

    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_cors_accepts_frontend() {
        let mut config = Config::default();
        config.server.frontend_url = Some("https://upscale.example.com/".to_string());
        assert!(setup_cors(&config).is_ok());
    }

    #[test]
    fn test_setup_cors_rejects_invalid_origin() {
        let mut config = Config::default();
        config.server.cors_origins = vec!["https://ok.example.com".to_string(), "bad\norigin".to_string()];
        assert!(setup_cors(&config).is_err());
    }
}
