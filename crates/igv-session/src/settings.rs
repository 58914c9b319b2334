//! Widget configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! app_name = "IGV"
//! session_key = "igv-session"
//! default_genome = "hg38"
//! enabled = true
//! ```

use crate::error::ConfigError;
use crate::store::DEFAULT_SESSION_KEY;
use crate::types::DEFAULT_GENOME;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Widget settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Prefix of the title template `"<app> | <reference>"`
    pub app_name: String,
    /// Host store key for the session
    pub session_key: String,
    /// Genome shown when no session is stored
    pub default_genome: String,
    /// When false the viewer is never created
    pub enabled: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            app_name: "IGV".to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            default_genome: DEFAULT_GENOME.to_string(),
            enabled: true,
        }
    }
}

impl WidgetConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With application name
    #[inline]
    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// With session key
    #[inline]
    #[must_use]
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// With default genome
    #[inline]
    #[must_use]
    pub fn with_default_genome(mut self, genome: impl Into<String>) -> Self {
        self.default_genome = genome.into();
        self
    }

    /// With enabled flag
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns [`ConfigError`] on invalid TOML or empty required values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that required values are non-empty
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("session_key", &self.session_key),
            ("default_genome", &self.default_genome),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
