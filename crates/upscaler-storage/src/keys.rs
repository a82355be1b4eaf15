//! Asset paths and root confinement.

use std::path::{Path, PathBuf};
use tokio::fs;
use upscaler_core::models::asset::asset_file_name;
use upscaler_core::AssetRole;

use crate::traits::{StorageError, StorageResult};

/// Canonical location of an asset: `{root}/{id}_{role}.{extension}`.
pub fn asset_path(root: &Path, id: &str, role: AssetRole, extension: &str) -> PathBuf {
    root.join(asset_file_name(id, role, extension))
}

/// Whether `path` sits directly under `root` (lexically, no filesystem access).
pub fn is_direct_child(root: &Path, path: &Path) -> bool {
    path.parent() == Some(root) && path.file_name().is_some()
}

/// Resolve `file_name` against the canonical `root` and make sure the result is still
/// a regular file directly under it.
///
/// Symlinks and relative segments are followed by canonicalization before the check, so
/// anything escaping the root ends up as `NotFound`, same as a missing file.
pub async fn resolve_confined(root: &Path, file_name: &str) -> StorageResult<PathBuf> {
    let not_found = || StorageError::NotFound(file_name.to_string());

    if file_name.is_empty() || file_name.contains('\0') {
        return Err(not_found());
    }

    let resolved = fs::canonicalize(root.join(file_name))
        .await
        .map_err(|_| not_found())?;

    if resolved.parent() != Some(root) {
        tracing::warn!(
            requested = %file_name,
            resolved = %resolved.display(),
            "Rejected asset reference resolving outside storage root"
        );
        return Err(not_found());
    }

    let metadata = fs::metadata(&resolved).await.map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_path_layout() {
        let root = Path::new("/srv/uploads");
        assert_eq!(
            asset_path(root, "abc", AssetRole::Derived, "png"),
            Path::new("/srv/uploads/abc_upscaled.png")
        );
    }

    #[test]
    fn test_is_direct_child() {
        let root = Path::new("/srv/uploads");
        assert!(is_direct_child(root, Path::new("/srv/uploads/a.png")));
        assert!(!is_direct_child(root, Path::new("/srv/uploads/sub/a.png")));
        assert!(!is_direct_child(root, Path::new("/srv/a.png")));
        assert!(!is_direct_child(root, Path::new("/srv/uploads")));
    }

    #[tokio::test]
    async fn test_resolve_confined_rejects_escapes() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("uploads");
        std::fs::create_dir(&root).unwrap();
        let root = root.canonicalize().unwrap();
        std::fs::write(parent.path().join("secret_upscaled.png"), b"secret").unwrap();
        std::fs::write(root.join("ok_upscaled.png"), b"ok").unwrap();

        assert!(resolve_confined(&root, "ok_upscaled.png").await.is_ok());

        for name in [
            "../secret_upscaled.png",
            "./../secret_upscaled.png",
            "",
            ".",
            "..",
            "missing_upscaled.png",
        ] {
            assert!(
                matches!(
                    resolve_confined(&root, name).await,
                    Err(StorageError::NotFound(_))
                ),
                "{name:?} should not resolve"
            );
        }

        let absolute = parent.path().join("secret_upscaled.png");
        assert!(matches!(
            resolve_confined(&root, absolute.to_str().unwrap()).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_confined_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("nested_upscaled.png")).unwrap();

        assert!(matches!(
            resolve_confined(&root, "nested_upscaled.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_confined_rejects_symlink_out_of_root() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("uploads");
        std::fs::create_dir(&root).unwrap();
        let root = root.canonicalize().unwrap();
        let outside = parent.path().join("outside.png");
        std::fs::write(&outside, b"outside").unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link_upscaled.png")).unwrap();

        assert!(matches!(
            resolve_confined(&root, "link_upscaled.png").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
