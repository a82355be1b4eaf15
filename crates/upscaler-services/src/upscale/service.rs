use std::sync::Arc;

use upscaler_core::{AssetRole, UpscaleOutcome, UpscaleRequest};
use upscaler_processing::{
    ImageTransformer, ImageValidator, OutputFormat, TransformError, ValidationError,
};
use upscaler_storage::{AssetStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validate → store original → re-validate stored bytes → upscale → store result
#[derive(Clone)]
pub struct UpscaleService {
    store: Arc<dyn AssetStore>,
    validator: Arc<ImageValidator>,
    transformer: Arc<ImageTransformer>,
}

impl UpscaleService {
    pub fn new(
        store: Arc<dyn AssetStore>,
        validator: ImageValidator,
        transformer: ImageTransformer,
    ) -> Self {
        Self {
            store,
            validator: Arc::new(validator),
            transformer: Arc::new(transformer),
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(
            file_name = %request.file_name,
            size_bytes = request.data.len(),
            scale = %request.scale
        )
    )]
    pub async fn upscale(&self, request: UpscaleRequest) -> Result<UpscaleOutcome, PipelineError> {
        let UpscaleRequest {
            data,
            file_name,
            scale,
        } = request;

        // Nothing touches the disk until the declared name and size pass.
        let extension = self.validator.validate_declared(&file_name, data.len())?;
        let format = OutputFormat::from_extension(&extension).ok_or_else(|| {
            PipelineError::Internal(format!("no output format for extension '{}'", extension))
        })?;

        let original = self.store.allocate(AssetRole::Original, &extension);
        let original_size = self.store.write(&original, &data).await?;
        drop(data);

        let stored = self
            .store
            .read(original.id.as_str(), original.role, &original.extension)
            .await?;

        let validator = Arc::clone(&self.validator);
        let (stored, verdict) = tokio::task::spawn_blocking(move || {
            let verdict = validator.validate_content(&stored);
            (stored, verdict)
        })
        .await
        .map_err(|e| PipelineError::Internal(format!("validation task failed: {}", e)))?;

        let info = match verdict {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(asset_id = %original.id, error = %e, "Stored upload is not a valid image");
                if let Err(delete_err) = self.store.delete(&original.path).await {
                    tracing::warn!(
                        asset_id = %original.id,
                        path = %original.path.display(),
                        error = %delete_err,
                        "Failed to remove rejected upload"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::debug!(
            asset_id = %original.id,
            format = %info.format,
            width = info.width,
            height = info.height,
            "Stored upload validated"
        );

        let transformer = Arc::clone(&self.transformer);
        let upscaled = tokio::task::spawn_blocking(move || transformer.upscale(&stored, scale, format))
            .await
            .map_err(|e| PipelineError::Internal(format!("upscale task failed: {}", e)))?
            .map_err(|e| {
                if let TransformError::Decode(ref source) = e {
                    tracing::error!(
                        asset_id = %original.id,
                        error = %source,
                        "Image passed validation but failed to decode for upscaling"
                    );
                }
                e
            })?;

        let derived = original.sibling(AssetRole::Derived);
        let upscaled_size = self.store.write(&derived, &upscaled.data).await?;

        tracing::info!(
            asset_id = %original.id,
            original_size,
            upscaled_size,
            source_width = upscaled.source_width,
            source_height = upscaled.source_height,
            width = upscaled.width,
            height = upscaled.height,
            "Upscale completed"
        );

        Ok(UpscaleOutcome {
            original,
            derived,
            original_size,
            upscaled_size,
            original_dimensions: (upscaled.source_width, upscaled.source_height),
            upscaled_dimensions: (upscaled.width, upscaled.height),
            scale,
        })
    }
}
