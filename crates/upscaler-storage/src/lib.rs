//! Upscaler Storage Library
//!
//! Owns the storage root and everything beneath it. Uploads and their upscaled results
//! are flat files named `{id}_{role}.{extension}` directly under the root; nothing else
//! in the workspace creates or removes files there.
//!
//! Reads resolve the requested name on disk first and only then check containment, so a
//! reference that escapes the root (relative segments, absolute paths, symlinks) is
//! reported as `NotFound` rather than sanitized.

pub mod factory;
pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_asset_store;
pub use local::LocalAssetStore;
pub use traits::{AssetStore, StorageError, StorageResult, StoredFile};
