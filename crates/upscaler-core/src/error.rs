//! Error types module
//!
//! All user-facing failures are unified under `AppError`. Each variant describes how
//! it should be presented through `ErrorMetadata` (status, code, log level, whether
//! details may be shown to the client).

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CORRUPT_IMAGE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing file: {0}")]
    MissingFile(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format '{extension}' (allowed: {})", allowed.join(", "))]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid scale factor: {0}")]
    InvalidScaleFactor(String),

    #[error("Corrupt image: {0}")]
    CorruptImage(String),

    #[error("Output too large: {width}x{height} exceeds {max_pixels} pixels")]
    OutputTooLarge {
        width: u64,
        height: u64,
        max_pixels: u64,
    },

    #[error("File too large: exceeds {max_bytes} bytes")]
    PayloadTooLarge { max_bytes: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Image processing error: {0}")]
    Processing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::MissingFile(_) => (
            400,
            "MISSING_FILE",
            false,
            Some("Send the image in a multipart field named 'file'"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedFormat { .. } => (
            400,
            "UNSUPPORTED_FORMAT",
            false,
            Some("Upload a PNG, JPG, JPEG or WebP file"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidScaleFactor(_) => (
            400,
            "INVALID_SCALE_FACTOR",
            false,
            Some("Use a numeric scale_factor greater than 0 and at most 10"),
            false,
            LogLevel::Debug,
        ),
        AppError::CorruptImage(_) => (
            400,
            "CORRUPT_IMAGE",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Debug,
        ),
        AppError::OutputTooLarge { .. } => (
            400,
            "OUTPUT_TOO_LARGE",
            false,
            Some("Use a smaller scale_factor or a smaller image"),
            false,
            LogLevel::Warn,
        ),
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Files expire after the retention window; upload the image again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Processing(_) => (
            500,
            "PROCESSING_ERROR",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingFile(_) => "MissingFile",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedFormat { .. } => "UnsupportedFormat",
            AppError::InvalidScaleFactor(_) => "InvalidScaleFactor",
            AppError::CorruptImage(_) => "CorruptImage",
            AppError::OutputTooLarge { .. } => "OutputTooLarge",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::NotFound(_) => "NotFound",
            AppError::Processing(_) => "Processing",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Full internal description, for logs and non-production responses
    pub fn detailed_message(&self) -> String {
        self.to_string()
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingFile(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::UnsupportedFormat { allowed, .. } => {
                format!("Invalid file type. Allowed: {}", allowed.join(", "))
            }
            AppError::InvalidScaleFactor(ref msg) => msg.clone(),
            AppError::CorruptImage(_) => "Uploaded file is not a valid image".to_string(),
            AppError::OutputTooLarge {
                width,
                height,
                max_pixels,
            } => format!(
                "Upscaled image would be {}x{} pixels, above the limit of {} pixels",
                width, height, max_pixels
            ),
            AppError::PayloadTooLarge { max_bytes } => {
                format!("File too large (max {} bytes)", max_bytes)
            }
            AppError::NotFound(_) => "File not found".to_string(),
            AppError::Processing(_) => "Image processing failed".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) => {
                "Server error occurred".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("../etc/passwd".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        // The requested reference is never echoed back.
        assert_eq!(err.client_message(), "File not found");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_unsupported_format_lists_allowed() {
        let err = AppError::UnsupportedFormat {
            extension: "gif".to_string(),
            allowed: vec!["png".to_string(), "jpg".to_string()],
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert!(err.client_message().contains("png, jpg"));
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_storage_is_sensitive() {
        let err = AppError::Storage("permission denied: /var/lib/uploads/x".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("/var/lib"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_processing_is_sensitive() {
        let err = AppError::Processing("encoder exploded".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Image processing failed");
        assert!(err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge { max_bytes: 1024 };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(err.client_message().contains("1024"));
    }

    #[test]
    fn test_detailed_message_keeps_internal_context() {
        let err = AppError::Storage("disk full at /srv/uploads".to_string());
        assert_eq!(err.detailed_message(), "Storage error: disk full at /srv/uploads");
        assert_eq!(err.client_message(), "Failed to access storage");
    }
}
