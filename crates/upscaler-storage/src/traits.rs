//! Storage abstraction trait
//!
//! This module defines the AssetStore trait the upload pipeline and the retention
//! sweeper are written against.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use upscaler_core::{Asset, AssetRole};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file found under the storage root, as seen by the sweeper.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub last_modified: SystemTime,
    pub size_bytes: u64,
}

/// Asset store abstraction
///
/// Paths handed out by `allocate` and `list_all` are always direct children of
/// `root()`. Implementations must refuse to touch anything else.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Canonical storage root
    fn root(&self) -> &Path;

    /// Reserve a fresh asset descriptor. Never reuses an id.
    fn allocate(&self, role: AssetRole, extension: &str) -> Asset;

    /// Durably persist `data` at the asset's path, returning the number of bytes written.
    async fn write(&self, asset: &Asset, data: &[u8]) -> StorageResult<u64>;

    /// Read an asset back by its parts.
    ///
    /// Returns `NotFound` if the file is missing or the name resolves outside the root.
    async fn read(&self, id: &str, role: AssetRole, extension: &str) -> StorageResult<Vec<u8>>;

    /// Every regular file directly under the root.
    async fn list_all(&self) -> StorageResult<Vec<StoredFile>>;

    /// Delete a file under the root. Returns `false` if it was already gone.
    async fn delete(&self, path: &Path) -> StorageResult<bool>;
}
