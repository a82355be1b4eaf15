use crate::image::processor::{ImageInfo, ImageProcessor};

/// Reasons an upload is refused before it reaches the transformer
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file selected")]
    EmptyFilename,

    #[error("Invalid file type: '{extension}' (allowed: {})", allowed.join(", "))]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Uploaded file is not a valid image: {0}")]
    CorruptImage(String),
}

/// Upload validator
///
/// Two stages, both of which have to pass: `validate_declared` looks only at what the
/// client claims (filename and size) and runs before anything is stored;
/// `validate_content` looks only at the bytes, as read back from storage.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    allowed_extensions: Vec<String>,
    max_file_size: usize,
}

impl ImageValidator {
    pub fn new(allowed_extensions: Vec<String>, max_file_size: usize) -> Self {
        Self {
            allowed_extensions,
            max_file_size,
        }
    }

    /// Check the declared filename and return its lowercase extension
    fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if extension.is_empty() || !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::UnsupportedFormat {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Validate file size
    fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Check that the bytes decode as an image of a recognizable format.
    ///
    /// Decodes fully so truncated files are caught, not just bad headers.
    pub fn validate_content(&self, data: &[u8]) -> Result<ImageInfo, ValidationError> {
        if data.is_empty() {
            return Err(ValidationError::CorruptImage("empty file".to_string()));
        }

        let info =
            ImageProcessor::inspect(data).map_err(|e| ValidationError::CorruptImage(e.to_string()))?;
        ImageProcessor::decode(data).map_err(|e| ValidationError::CorruptImage(e.to_string()))?;

        Ok(info)
    }

    /// Pre-storage checks, extension first, then size. Returns the lowercase extension.
    pub fn validate_declared(&self, filename: &str, size: usize) -> Result<String, ValidationError> {
        let extension = self.validate_extension(filename)?;
        self.validate_file_size(size)?;
        Ok(extension)
    }
}
