use tokio_util::sync::CancellationToken;
use upscaler_api::setup;
use upscaler_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under image workloads.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    upscaler_api::telemetry::init_telemetry(config.server.log_json)?;

    let (state, router) = setup::initialize_app(config).await?;

    let shutdown = CancellationToken::new();
    let sweeper = setup::start_retention_sweeper(&state, shutdown.clone());

    let served = setup::server::start_server(&state.config, router, shutdown.clone()).await;

    // Stop the sweeper whether the server exited cleanly or not.
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::error!(error = %e, "Retention sweeper task failed");
    }

    served
}
