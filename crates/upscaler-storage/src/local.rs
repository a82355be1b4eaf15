use crate::keys::{asset_path, is_direct_child, resolve_confined};
use crate::traits::{AssetStore, StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use upscaler_core::models::asset::asset_file_name;
use upscaler_core::{Asset, AssetId, AssetRole};

/// Local filesystem asset store
#[derive(Clone, Debug)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    /// Create a new LocalAssetStore, creating the root directory if needed
    ///
    /// # Arguments
    /// * `root` - Directory holding every asset (e.g., "static/uploads")
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        // Containment checks compare against the canonical form.
        let root = fs::canonicalize(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to canonicalize storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalAssetStore { root })
    }

    fn ensure_confined(&self, path: &Path) -> StorageResult<()> {
        if is_direct_child(&self.root, path) {
            Ok(())
        } else {
            Err(StorageError::InvalidKey(format!(
                "{} is not directly under the storage root",
                path.display()
            )))
        }
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn allocate(&self, role: AssetRole, extension: &str) -> Asset {
        let id = AssetId::generate();
        let path = asset_path(&self.root, id.as_str(), role, extension);
        Asset {
            id,
            role,
            extension: extension.to_string(),
            created_at: Utc::now(),
            path,
        }
    }

    async fn write(&self, asset: &Asset, data: &[u8]) -> StorageResult<u64> {
        let expected = self
            .root
            .join(asset_file_name(asset.id.as_str(), asset.role, &asset.extension));
        if asset.path != expected {
            return Err(StorageError::InvalidKey(format!(
                "asset path {} does not match its id",
                asset.path.display()
            )));
        }
        self.ensure_confined(&asset.path)?;

        let start = std::time::Instant::now();

        // Ids are never reused, so an existing file here is a bug, not something to overwrite.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&asset.path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    asset.path.display(),
                    e
                ))
            })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                asset.path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to sync file {}: {}",
                asset.path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %asset.path.display(),
            asset_id = %asset.id,
            role = %asset.role,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(data.len() as u64)
    }

    async fn read(&self, id: &str, role: AssetRole, extension: &str) -> StorageResult<Vec<u8>> {
        let file_name = asset_file_name(id, role, extension);
        let path = resolve_confined(&self.root, &file_name).await?;
        let start = std::time::Instant::now();

        let data = match fs::read(&path).await {
            Ok(data) => data,
            // Swept between resolution and read.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(file_name));
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage read successful"
        );

        Ok(data)
    }

    async fn list_all(&self) -> StorageResult<Vec<StoredFile>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // Does not follow symlinks.
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to stat stored file");
                    continue;
                }
            };

            if !metadata.is_file() {
                continue;
            }

            let last_modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "No modification time for stored file");
                    continue;
                }
            };

            files.push(StoredFile {
                path,
                last_modified,
                size_bytes: metadata.len(),
            });
        }

        Ok(files)
    }

    async fn delete(&self, path: &Path) -> StorageResult<bool> {
        self.ensure_confined(path)?;

        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Local storage delete successful");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalAssetStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path().join("uploads")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_new_creates_and_canonicalizes_root() {
        let (dir, store) = store().await;
        assert!(store.root().is_dir());
        assert_eq!(
            store.root(),
            dir.path().join("uploads").canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn test_allocate_places_asset_under_root() {
        let (_dir, store) = store().await;
        let a = store.allocate(AssetRole::Original, "png");
        let b = store.allocate(AssetRole::Original, "png");

        assert_ne!(a.id, b.id);
        assert_eq!(a.path.parent(), Some(store.root()));
        assert_eq!(
            a.path.file_name().unwrap().to_str().unwrap(),
            format!("{}_original.png", a.id)
        );
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_dir, store) = store().await;
        let asset = store.allocate(AssetRole::Derived, "jpg");

        let written = store.write(&asset, b"jpeg bytes").await.unwrap();
        assert_eq!(written, 10);

        let data = store
            .read(asset.id.as_str(), AssetRole::Derived, "jpg")
            .await
            .unwrap();
        assert_eq!(data, b"jpeg bytes");

        // Same id, other role: nothing stored.
        assert!(matches!(
            store.read(asset.id.as_str(), AssetRole::Original, "jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_write_refuses_tampered_path() {
        let (dir, store) = store().await;
        let mut asset = store.allocate(AssetRole::Original, "png");
        asset.path = dir.path().join(asset.file_name());

        assert!(matches!(
            store.write(&asset, b"x").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(!asset.path.exists());
    }

    #[tokio::test]
    async fn test_write_never_overwrites() {
        let (_dir, store) = store().await;
        let asset = store.allocate(AssetRole::Original, "png");
        store.write(&asset, b"first").await.unwrap();

        assert!(matches!(
            store.write(&asset, b"second").await,
            Err(StorageError::WriteFailed(_))
        ));
        assert_eq!(std::fs::read(&asset.path).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let (dir, store) = store().await;
        std::fs::write(dir.path().join("secret_upscaled.png"), b"secret").unwrap();

        let result = store.read("../secret", AssetRole::Derived, "png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, store) = store().await;
        let asset = store.allocate(AssetRole::Original, "webp");
        store.write(&asset, b"data").await.unwrap();

        assert!(store.delete(&asset.path).await.unwrap());
        assert!(!store.delete(&asset.path).await.unwrap());
        assert!(!asset.path.exists());
    }

    #[tokio::test]
    async fn test_delete_outside_root_is_refused() {
        let (dir, store) = store().await;
        let outside = dir.path().join("keep.png");
        std::fs::write(&outside, b"keep").unwrap();

        assert!(matches!(
            store.delete(&outside).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_list_all_returns_files_only() {
        let (_dir, store) = store().await;
        let a = store.allocate(AssetRole::Original, "png");
        let b = a.sibling(AssetRole::Derived);
        store.write(&a, b"aa").await.unwrap();
        store.write(&b, b"bbb").await.unwrap();
        std::fs::create_dir(store.root().join("subdir")).unwrap();

        let mut files = store.list_all().await.unwrap();
        files.sort_by(|x, y| x.path.cmp(&y.path));

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, a.path);
        assert_eq!(files[0].size_bytes, 2);
        assert_eq!(files[1].path, b.path);
        assert_eq!(files[1].size_bytes, 3);
    }
}
