use crate::{AssetStore, LocalAssetStore, StorageResult};
use std::sync::Arc;
use upscaler_core::StorageConfig;

/// Create the asset store described by the configuration
pub async fn create_asset_store(config: &StorageConfig) -> StorageResult<Arc<dyn AssetStore>> {
    let store = LocalAssetStore::new(&config.upload_dir).await?;

    tracing::info!(
        root = %store.root().display(),
        "Local asset store initialized"
    );

    Ok(Arc::new(store))
}
