//! Upscaler Core Library
//!
//! Domain models, error types and configuration shared by every Upscaler crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ProcessingConfig, RetentionPolicy, ServerConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    Asset, AssetId, AssetKey, AssetRole, ScaleFactor, ScaleFactorError, UpscaleOutcome,
    UpscaleRequest,
};
