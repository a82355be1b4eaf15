//! Stored asset descriptors and the file naming scheme.
//!
//! An asset lives at `{storage_root}/{id}_{role}.{extension}`. The id is generated
//! server-side, so a caller-supplied filename never reaches a filesystem path.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Whether an asset is the uploaded source or the upscaled result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRole {
    Original,
    Derived,
}

impl AssetRole {
    /// Suffix used in file names.
    pub fn suffix(&self) -> &'static str {
        match self {
            AssetRole::Original => "original",
            AssetRole::Derived => "upscaled",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "original" => Some(AssetRole::Original),
            "upscaled" => Some(AssetRole::Derived),
            _ => None,
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Opaque per-upload identifier: 128 random bits as 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetId(String);

impl AssetId {
    pub fn generate() -> Self {
        AssetId(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the canonical file name for an asset.
pub fn asset_file_name(id: &str, role: AssetRole, extension: &str) -> String {
    format!("{}_{}.{}", id, role.suffix(), extension)
}

/// A stored file, original or derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: AssetId,
    pub role: AssetRole,
    pub extension: String,
    pub created_at: DateTime<Utc>,
    /// Absolute location, always a direct child of the storage root.
    pub path: PathBuf,
}

impl Asset {
    pub fn file_name(&self) -> String {
        asset_file_name(self.id.as_str(), self.role, &self.extension)
    }

    /// The asset sharing this one's id and extension under another role.
    pub fn sibling(&self, role: AssetRole) -> Asset {
        let file_name = asset_file_name(self.id.as_str(), role, &self.extension);
        Asset {
            id: self.id.clone(),
            role,
            extension: self.extension.clone(),
            created_at: Utc::now(),
            path: self.path.with_file_name(file_name),
        }
    }
}

/// The parts of a client-supplied asset reference such as `"{id}_upscaled.png"`.
///
/// Parsing is purely lexical. The id is not checked here, so a reference like
/// `"../x_upscaled.png"` parses; rejecting it is the storage layer's job, after
/// the path has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetKey {
    pub id: String,
    pub role: AssetRole,
    pub extension: String,
}

impl AssetKey {
    pub fn parse(file_name: &str) -> Option<Self> {
        let (stem, extension) = file_name.rsplit_once('.')?;
        let (id, suffix) = stem.rsplit_once('_')?;
        let role = AssetRole::from_suffix(suffix)?;

        if id.is_empty() || extension.is_empty() {
            return None;
        }

        Some(AssetKey {
            id: id.to_string(),
            role,
            extension: extension.to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        asset_file_name(&self.id, self.role, &self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;

    #[test]
    fn test_generated_ids_are_hex_and_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| AssetId::generate().0).collect();
        assert_eq!(ids.len(), 1000);
        for id in &ids {
            assert_eq!(id.len(), 32);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_file_name_layout() {
        assert_eq!(
            asset_file_name("abc", AssetRole::Original, "png"),
            "abc_original.png"
        );
        assert_eq!(
            asset_file_name("abc", AssetRole::Derived, "jpg"),
            "abc_upscaled.jpg"
        );
    }

    #[test]
    fn test_sibling_shares_id_and_directory() {
        let original = Asset {
            id: AssetId("0123".to_string()),
            role: AssetRole::Original,
            extension: "webp".to_string(),
            created_at: Utc::now(),
            path: Path::new("/data/uploads/0123_original.webp").to_path_buf(),
        };
        let derived = original.sibling(AssetRole::Derived);
        assert_eq!(derived.id, original.id);
        assert_eq!(derived.role, AssetRole::Derived);
        assert_eq!(
            derived.path,
            Path::new("/data/uploads/0123_upscaled.webp")
        );
    }

    #[test]
    fn test_parse_key() {
        let key = AssetKey::parse("deadbeef_upscaled.png").unwrap();
        assert_eq!(key.id, "deadbeef");
        assert_eq!(key.role, AssetRole::Derived);
        assert_eq!(key.extension, "png");
        assert_eq!(key.file_name(), "deadbeef_upscaled.png");

        let key = AssetKey::parse("dead_beef_original.jpeg").unwrap();
        assert_eq!(key.id, "dead_beef");
        assert_eq!(key.role, AssetRole::Original);
    }

    #[test]
    fn test_parse_key_rejects_malformed() {
        assert!(AssetKey::parse("noextension").is_none());
        assert!(AssetKey::parse("abc.png").is_none());
        assert!(AssetKey::parse("abc_thumbnail.png").is_none());
        assert!(AssetKey::parse("_upscaled.png").is_none());
        assert!(AssetKey::parse("abc_upscaled.").is_none());
        assert!(AssetKey::parse("../../etc/passwd").is_none());
    }

    #[test]
    fn test_parse_key_is_lexical_only() {
        // Left for the store to reject after resolution.
        let key = AssetKey::parse("../secret_upscaled.png").unwrap();
        assert_eq!(key.id, "../secret");
    }
}
