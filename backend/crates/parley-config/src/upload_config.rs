use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_UPLOAD_DIR,
    DEFAULT_UPLOAD_MAX_BYTES, MAX_UPLOAD_MAX_BYTES,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Upload directory, relative to the config directory
    pub dir: String,
    pub max_bytes: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: String::from(DEFAULT_UPLOAD_DIR),
            max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl UploadConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let dir = std::path::Path::new(&self.dir);
        if self.dir.trim().is_empty() || dir.is_absolute() || self.dir.contains("..") {
            return Err(ConfigError::uploads(
                "uploads.dir must be a non-empty relative path without '..'",
            ));
        }

        if self.max_bytes == 0 || self.max_bytes > MAX_UPLOAD_MAX_BYTES {
            return Err(ConfigError::uploads(format!(
                "uploads.max_bytes must be 1-{}, got {}",
                MAX_UPLOAD_MAX_BYTES, self.max_bytes
            )));
        }

        if self.allowed_mime_types.is_empty() {
            return Err(ConfigError::uploads(
                "uploads.allowed_mime_types cannot be empty",
            ));
        }

        Ok(())
    }

    pub fn is_allowed(&self, mime: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime)
    }
}
