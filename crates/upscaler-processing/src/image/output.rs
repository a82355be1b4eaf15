use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageResult};

const JPEG_QUALITY: u8 = 95;

/// Encoding used for an upscaled result. Chosen from the uploaded file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// Map a lowercase extension to its output format
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// Get MIME type for output format
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// Encode with fixed settings: JPEG quality 95, PNG best compression with adaptive
    /// filtering, lossless WebP.
    pub fn encode(self, image: &DynamicImage) -> ImageResult<Vec<u8>> {
        let mut buffer = Vec::new();

        match self {
            OutputFormat::Jpeg => {
                image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY))?
            }
            OutputFormat::Png => image.write_with_encoder(PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Best,
                PngFilterType::Adaptive,
            ))?,
            OutputFormat::WebP => image.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?,
        }

        Ok(buffer)
    }
}
