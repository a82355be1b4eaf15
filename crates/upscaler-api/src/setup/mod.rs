//! Application setup and initialization
//!
//! Builds every component from one `Config` value. Nothing below this layer reads the
//! environment.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use upscaler_core::Config;
use upscaler_processing::{ImageTransformer, ImageValidator};
use upscaler_services::{RetentionSweeper, UpscaleService};
use upscaler_storage::create_asset_store;

use crate::state::AppState;

/// Create the asset store and the services on top of it
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    let store = create_asset_store(&config.storage)
        .await
        .context("Failed to initialize asset store")?;

    let validator = ImageValidator::new(
        config.storage.allowed_extensions.clone(),
        config.storage.max_content_length,
    );
    let transformer = ImageTransformer::new(config.processing.max_output_pixels);
    let upscale = UpscaleService::new(store.clone(), validator, transformer);

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        upscale,
    }))
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    let state = build_state(config).await?;
    let router = routes::setup_routes(&state.config, state.clone())?;

    tracing::info!(
        upload_dir = %state.store.root().display(),
        environment = %state.config.server.environment,
        "Application initialized"
    );

    Ok((state, router))
}

/// Spawn the retention sweeper; it runs until `shutdown` is cancelled
pub fn start_retention_sweeper(state: &AppState, shutdown: CancellationToken) -> JoinHandle<()> {
    let sweeper = Arc::new(RetentionSweeper::new(
        state.store.clone(),
        state.config.retention,
    ));
    sweeper.start(shutdown)
}
