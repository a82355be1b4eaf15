//! Process-wide constants.

/// Formats the pipeline can both decode and re-encode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Upper bound (inclusive) for a requested scale factor.
pub const MAX_SCALE_FACTOR: f64 = 10.0;

/// Scale factor used when the caller does not send one.
pub const DEFAULT_SCALE_FACTOR: f64 = 2.0;

/// Prefix of the filename suggested to clients downloading a derived asset.
pub const DOWNLOAD_NAME_PREFIX: &str = "upscaled_";

/// Public path under which stored assets are served inline.
pub const STATIC_UPLOADS_PATH: &str = "/static/uploads";

/// Public path for attachment downloads of derived assets.
pub const DOWNLOAD_PATH: &str = "/download";
