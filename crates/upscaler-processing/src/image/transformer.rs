//! Image transformer - the upscale pipeline
//!
//! 1. Read dimensions from the header and bound the output size
//! 2. Decode and normalize the color layout (8-bit RGB, or 8-bit grey)
//! 3. Lanczos3 resample to `max(1, floor(w·s)) × max(1, floor(h·s))`
//! 4. Unsharp mask
//! 5. Encode in the requested output format

use crate::image::output::OutputFormat;
use crate::image::processor::ImageProcessor;
use crate::image::sharpen::UnsharpMask;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use upscaler_core::ScaleFactor;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] ImageError),

    #[error("Output of {width}x{height} exceeds the limit of {max_pixels} pixels")]
    OutputTooLarge {
        width: u64,
        height: u64,
        max_pixels: u64,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[source] ImageError),
}

/// Encoded result of an upscale
#[derive(Debug, Clone)]
pub struct UpscaledImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

pub struct ImageTransformer {
    max_output_pixels: u64,
    sharpen: UnsharpMask,
}

impl ImageTransformer {
    pub fn new(max_output_pixels: u64) -> Self {
        Self {
            max_output_pixels,
            sharpen: UnsharpMask::default(),
        }
    }

    /// Enlarge `data` by `scale`, then sharpen and encode.
    ///
    /// Deterministic: the same input bytes and scale always produce the same pixels.
    pub fn upscale(
        &self,
        data: &[u8],
        scale: ScaleFactor,
        format: OutputFormat,
    ) -> Result<UpscaledImage, TransformError> {
        let info = ImageProcessor::inspect(data).map_err(TransformError::Decode)?;
        let (width, height) = self.checked_target(scale, info.width, info.height)?;

        let source = ImageProcessor::decode(data).map_err(TransformError::Decode)?;
        let source = normalize_color(source);

        let resized = source.resize_exact(width, height, FilterType::Lanczos3);
        let sharpened = self.sharpen.apply_dynamic(&resized);

        let data = format.encode(&sharpened).map_err(TransformError::Encode)?;

        tracing::debug!(
            source_width = info.width,
            source_height = info.height,
            width,
            height,
            scale = scale.get(),
            size_bytes = data.len(),
            "Image upscaled"
        );

        Ok(UpscaledImage {
            data,
            width,
            height,
            source_width: info.width,
            source_height: info.height,
        })
    }

    /// Target dimensions, refused before any pixel buffer is allocated if too large.
    fn checked_target(
        &self,
        scale: ScaleFactor,
        source_width: u32,
        source_height: u32,
    ) -> Result<(u32, u32), TransformError> {
        let (width, height) = scale.target_dimensions(source_width, source_height);
        let too_large = || TransformError::OutputTooLarge {
            width,
            height,
            max_pixels: self.max_output_pixels,
        };

        if width.saturating_mul(height) > self.max_output_pixels {
            return Err(too_large());
        }

        let width = u32::try_from(width).map_err(|_| too_large())?;
        let height = u32::try_from(height).map_err(|_| too_large())?;
        Ok((width, height))
    }
}

/// Palette, alpha and high bit-depth images become 8-bit RGB. 8-bit grey stays grey.
fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
