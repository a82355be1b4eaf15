//! Image processing module
//!
//! - Header inspection and decoding (processor)
//! - Output encoding per file extension (output)
//! - Unsharp-mask sharpening (sharpen)
//! - The upscale pipeline itself (transformer)

pub mod output;
pub mod processor;
pub mod sharpen;
pub mod transformer;

pub use output::OutputFormat;
pub use processor::{ImageInfo, ImageProcessor};
pub use sharpen::UnsharpMask;
pub use transformer::{ImageTransformer, TransformError, UpscaledImage};
