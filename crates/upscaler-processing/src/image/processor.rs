//! Image processor - header inspection and decoding

use image::{DynamicImage, ImageReader, ImageResult};
use std::io::Cursor;

/// What the header says about an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

pub struct ImageProcessor;

impl ImageProcessor {
    fn reader(data: &[u8]) -> ImageResult<ImageReader<Cursor<&[u8]>>> {
        Ok(ImageReader::new(Cursor::new(data)).with_guessed_format()?)
    }

    /// Read format and dimensions from the header without decoding pixel data
    pub fn inspect(data: &[u8]) -> ImageResult<ImageInfo> {
        let reader = Self::reader(data)?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string());
        let (width, height) = reader.into_dimensions()?;

        Ok(ImageInfo {
            width,
            height,
            format,
        })
    }

    /// Fully decode an image, whatever its extension claims
    pub fn decode(data: &[u8]) -> ImageResult<DynamicImage> {
        Self::reader(data)?.decode()
    }
}
