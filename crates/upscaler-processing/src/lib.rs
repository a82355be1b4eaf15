//! Upscaler Processing Library
//!
//! Image validation and the upscale transform (Lanczos resample followed by a fixed
//! unsharp mask). Everything here is synchronous and CPU-bound; callers run it on a
//! blocking thread.

pub mod image;
pub mod validator;

pub use crate::image::{
    ImageInfo, ImageProcessor, ImageTransformer, OutputFormat, TransformError, UnsharpMask,
    UpscaledImage,
};
pub use validator::{ImageValidator, ValidationError};
