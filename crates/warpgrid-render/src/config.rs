//! Render settings, loadable from TOML.
//!
//! ```toml
//! buffer_size = 4096
//! text_content_type = "text/plain"
//! view_content_type = "text/html"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::media_type::MediaType;
use crate::writer::DEFAULT_BUFFER_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Text buffered before the writer encodes and writes it out.
    pub buffer_size: usize,
    /// Fallback content type for raw content.
    pub text_content_type: MediaType,
    /// Fallback content type for rendered views.
    pub view_content_type: MediaType,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            text_content_type: MediaType::text_plain(),
            view_content_type: MediaType::text_html(),
        }
    }
}

impl RenderConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
