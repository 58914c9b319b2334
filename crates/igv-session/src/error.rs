//! Error types for session persistence
//!
//! Persistence failures never reach the viewer lifecycle: [`crate::SessionStore::save`]
//! logs them and carries on.

use std::path::PathBuf;

/// Failure reported by a key/value backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend is unavailable (quota, permissions, closed storage)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// IO error on a file-backed store
    #[error("io error on {path}: {source}")]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes are not valid JSON
    #[error("corrupt store contents: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Save/load against the host store failed
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Backend rejected the operation
    #[error("session store error under key '{key}': {source}")]
    Store {
        /// Session key
        key: String,
        /// Backend failure
        #[source]
        source: StoreError,
    },

    /// Stored value does not have the configuration shape
    #[error("stored session under key '{key}' is unreadable: {source}")]
    Unparseable {
        /// Session key
        key: String,
        /// Decoding failure
        #[source]
        source: serde_json::Error,
    },
}

/// Widget configuration could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("io error reading {path}: {source}")]
    Io {
        /// Configuration file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("invalid configuration value for '{field}': {message}")]
    InvalidValue {
        /// Setting name
        field: String,
        /// What is wrong with it
        message: String,
    },
}
