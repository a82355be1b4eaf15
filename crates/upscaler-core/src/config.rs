//! Configuration module
//!
//! Configuration is read once at startup (`Config::from_env`) and handed to each
//! component explicitly. Nothing below the bootstrap layer reads the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::SUPPORTED_EXTENSIONS;

// Common constants
const SERVER_PORT: u16 = 5000;
const UPLOAD_DIR: &str = "static/uploads";
const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;
const FILE_RETENTION_HOURS: u64 = 6;
const CLEANUP_INTERVAL_SECS: u64 = 3600;
const RETENTION_GRACE_SECS: u64 = 60;
const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// HTTP-facing settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// Where `GET /` redirects. Also added to the CORS allow-list.
    pub frontend_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_json: bool,
}

/// Storage root and upload acceptance rules
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_content_length: usize,
    pub allowed_extensions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    /// Largest output (width × height) the transformer will allocate.
    pub max_output_pixels: u64,
}

/// Retention settings for stored assets.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Age after which an asset becomes eligible for deletion.
    pub ttl: Duration,
    /// Period between two sweeps.
    pub sweep_interval: Duration,
    /// Files modified more recently than this are never deleted, whatever `ttl` says.
    pub grace: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(FILE_RETENTION_HOURS * 3600),
            sweep_interval: Duration::from_secs(CLEANUP_INTERVAL_SECS),
            grace: Duration::from_secs(RETENTION_GRACE_SECS),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
    pub retention: RetentionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: SERVER_PORT,
                frontend_url: None,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                log_json: false,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from(UPLOAD_DIR),
                max_content_length: MAX_CONTENT_LENGTH,
                allowed_extensions: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            },
            processing: ProcessingConfig {
                max_output_pixels: MAX_OUTPUT_PIXELS,
            },
            retention: RetentionPolicy::default(),
        }
    }
}

impl Config {
    /// Default configuration rooted at `upload_dir`.
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.storage.upload_dir = upload_dir.into();
        config
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.server.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(SERVER_PORT);

        let frontend_url = env::var("FRONTEND_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let cors_origins = split_list(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            false,
        );

        let log_json = env::var("LOG_FORMAT")
            .map(|s| s.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.upload_dir);

        let max_content_length = env::var("MAX_CONTENT_LENGTH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_CONTENT_LENGTH);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .map(|s| split_list(&s, true))
            .unwrap_or(defaults.storage.allowed_extensions);

        let retention_hours = env::var("FILE_RETENTION_HOURS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(FILE_RETENTION_HOURS);

        let cleanup_interval_secs = env::var("CLEANUP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(CLEANUP_INTERVAL_SECS);

        let grace_secs = env::var("RETENTION_GRACE_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(RETENTION_GRACE_SECS);

        let max_output_pixels = env::var("MAX_OUTPUT_PIXELS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(MAX_OUTPUT_PIXELS);

        let config = Config {
            server: ServerConfig {
                port,
                frontend_url,
                cors_origins,
                environment,
                log_json,
            },
            storage: StorageConfig {
                upload_dir,
                max_content_length,
                allowed_extensions,
            },
            processing: ProcessingConfig { max_output_pixels },
            retention: RetentionPolicy {
                ttl: Duration::from_secs(retention_hours * 3600),
                sweep_interval: Duration::from_secs(cleanup_interval_secs),
                grace: Duration::from_secs(grace_secs),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on misconfiguration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        if let Some(ext) = self
            .storage
            .allowed_extensions
            .iter()
            .find(|ext| !SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS contains unsupported extension '{}' (supported: {})",
                ext,
                SUPPORTED_EXTENSIONS.join(",")
            ));
        }

        if self.storage.max_content_length == 0 {
            return Err(anyhow::anyhow!("MAX_CONTENT_LENGTH must be greater than 0"));
        }

        if self.processing.max_output_pixels == 0 {
            return Err(anyhow::anyhow!("MAX_OUTPUT_PIXELS must be greater than 0"));
        }

        if self.retention.ttl.is_zero() {
            return Err(anyhow::anyhow!("FILE_RETENTION_HOURS must be greater than 0"));
        }

        if self.retention.sweep_interval.is_zero() {
            return Err(anyhow::anyhow!("CLEANUP_INTERVAL_SECS must be greater than 0"));
        }

        if self.retention.grace >= self.retention.ttl {
            return Err(anyhow::anyhow!(
                "RETENTION_GRACE_SECS must be shorter than the retention time-to-live"
            ));
        }

        if self.is_production()
            && self.server.frontend_url.is_none()
            && self.server.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production without FRONTEND_URL. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

fn split_list(raw: &str, lowercase: bool) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if lowercase {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retention.ttl, Duration::from_secs(6 * 3600));
        assert_eq!(config.retention.sweep_interval, Duration::from_secs(3600));
        assert_eq!(config.storage.max_content_length, 16 * 1024 * 1024);
        assert_eq!(
            config.storage.allowed_extensions,
            vec!["png", "jpg", "jpeg", "webp"]
        );
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let mut config = Config::default();
        config.storage.allowed_extensions.push("tiff".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tiff"));
    }

    #[test]
    fn test_rejects_grace_longer_than_ttl() {
        let mut config = Config::default();
        config.retention.grace = config.retention.ttl;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_explicit_origins() {
        let mut config = Config::default();
        config.server.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.server.frontend_url = Some("https://example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" PNG, jpg ,,", true), vec!["png", "jpg"]);
        assert_eq!(
            split_list("https://a.example,https://B.example", false),
            vec!["https://a.example", "https://B.example"]
        );
    }
}
