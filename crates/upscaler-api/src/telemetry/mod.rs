use anyhow::Context;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "upscaler=debug,tower_http=debug";

/// Initialize tracing: `RUST_LOG` (or the default filter) plus a compact or JSON console layer.
pub fn init_telemetry(log_json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("Failed to initialize tracing")?;
    } else {
        let console_fmt = tracing_subscriber::fmt::layer()
            .event_format(Format::default().compact().with_target(false));
        registry
            .with(console_fmt)
            .try_init()
            .context("Failed to initialize tracing")?;
    }

    tracing::debug!(log_json, "Tracing initialized");
    Ok(())
}
