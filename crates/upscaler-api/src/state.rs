//! Application state shared by all handlers.

use std::sync::Arc;

use upscaler_core::Config;
use upscaler_services::UpscaleService;
use upscaler_storage::AssetStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn AssetStore>,
    pub upscale: UpscaleService,
}
