use crate::constants::{DEFAULT_SCALE_FACTOR, MAX_SCALE_FACTOR};
use crate::models::asset::Asset;
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScaleFactorError {
    #[error("scale_factor must be numeric (got '{0}')")]
    NotNumeric(String),

    #[error("scale_factor must be >0 and <={max} (got {0})", max = MAX_SCALE_FACTOR)]
    OutOfRange(f64),
}

/// Enlargement ratio, guaranteed to lie in `(0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> Result<Self, ScaleFactorError> {
        // Written so NaN falls through to the error branch.
        if value > 0.0 && value <= MAX_SCALE_FACTOR {
            Ok(ScaleFactor(value))
        } else {
            Err(ScaleFactorError::OutOfRange(value))
        }
    }

    /// Parse the textual form field; a missing field means the default factor of 2.
    pub fn parse(raw: Option<&str>) -> Result<Self, ScaleFactorError> {
        let Some(raw) = raw else {
            return Ok(ScaleFactor(DEFAULT_SCALE_FACTOR));
        };

        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ScaleFactorError::NotNumeric(raw.to_string()))?;

        Self::new(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// `(max(1, floor(width × s)), max(1, floor(height × s)))`.
    ///
    /// Returned as `u64` so callers can bound the pixel count before narrowing.
    pub fn target_dimensions(self, width: u32, height: u32) -> (u64, u64) {
        let scale = |side: u32| ((side as f64 * self.0).floor() as u64).max(1);
        (scale(width), scale(height))
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        ScaleFactor(DEFAULT_SCALE_FACTOR)
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ephemeral input of the upscale pipeline.
#[derive(Debug, Clone)]
pub struct UpscaleRequest {
    pub data: Vec<u8>,
    /// Filename declared by the client. Only its extension is ever used.
    pub file_name: String,
    pub scale: ScaleFactor,
}

/// What the pipeline reports back after both assets are stored.
#[derive(Debug, Clone)]
pub struct UpscaleOutcome {
    pub original: Asset,
    pub derived: Asset,
    pub original_size: u64,
    pub upscaled_size: u64,
    pub original_dimensions: (u32, u32),
    pub upscaled_dimensions: (u32, u32),
    pub scale: ScaleFactor,
}
