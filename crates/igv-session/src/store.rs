//! Session Store Adapter
//!
//! Bridges the host's key/value capability to typed session load/save.
//! Saves are fire-and-forget: failures are logged and never propagated.

use crate::error::{PersistenceError, StoreError};
use crate::settings::WidgetConfig;
use crate::types::{LoadConfiguration, SessionState, DEFAULT_GENOME};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Key the session is stored under unless configured otherwise
pub const DEFAULT_SESSION_KEY: &str = "igv-session";

/// Host-backed persistent key/value capability
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when nothing is stored
    ///
    /// # Errors
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns [`StoreError`] if the backend rejects the write.
    fn set_item(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Check if store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.items.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Stores and retrieves the last-known viewer configuration under a fixed key
///
/// Without a backend the store runs in non-persistent mode: loads return the
/// default configuration and saves are dropped.
#[derive(Clone)]
pub struct SessionStore {
    backend: Option<Arc<dyn KeyValueStore>>,
    key: String,
    default_genome: String,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("persistent", &self.backend.is_some())
            .field("key", &self.key)
            .field("default_genome", &self.default_genome)
            .finish()
    }
}

impl SessionStore {
    /// Create store over a backend
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
            key: DEFAULT_SESSION_KEY.to_string(),
            default_genome: DEFAULT_GENOME.to_string(),
        }
    }

    /// Create store that persists nothing
    #[must_use]
    pub fn non_persistent() -> Self {
        Self {
            backend: None,
            key: DEFAULT_SESSION_KEY.to_string(),
            default_genome: DEFAULT_GENOME.to_string(),
        }
    }

    /// Create store from widget configuration
    #[must_use]
    pub fn from_config(backend: Option<Arc<dyn KeyValueStore>>, config: &WidgetConfig) -> Self {
        Self {
            backend,
            key: config.session_key.clone(),
            default_genome: config.default_genome.clone(),
        }
    }

    /// With storage key
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// With genome used when nothing is stored
    #[inline]
    #[must_use]
    pub fn with_default_genome(mut self, genome: impl Into<String>) -> Self {
        self.default_genome = genome.into();
        self
    }

    /// Storage key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a backend is attached
    #[inline]
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    /// Configuration used when nothing usable is stored
    #[must_use]
    pub fn default_configuration(&self) -> LoadConfiguration {
        LoadConfiguration::for_genome(self.default_genome.as_str())
    }

    /// Last stored configuration, or the default
    #[must_use]
    pub fn load(&self) -> LoadConfiguration {
        match self.try_load() {
            Ok(Some(config)) => {
                tracing::debug!(key = %self.key, tracks = config.tracks.len(), "Restored session");
                config
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "No stored session, using default");
                self.default_configuration()
            }
            Err(e) => {
                tracing::warn!("Falling back to default session: {}", e);
                self.default_configuration()
            }
        }
    }

    /// Last stored configuration
    ///
    /// Values stored as JSON text are parsed; `null` counts as absent.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the backend fails or the stored value is
    /// not a configuration.
    pub fn try_load(&self) -> Result<Option<LoadConfiguration>, PersistenceError> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };

        let stored = backend
            .get_item(&self.key)
            .map_err(|source| PersistenceError::Store {
                key: self.key.clone(),
                source,
            })?;

        let value = match stored {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(text)) => {
                serde_json::from_str(&text).map_err(|source| PersistenceError::Unparseable {
                    key: self.key.clone(),
                    source,
                })?
            }
            Some(value) => value,
        };

        SessionState::from_value(value)
            .to_load_configuration()
            .map(Some)
            .map_err(|source| PersistenceError::Unparseable {
                key: self.key.clone(),
                source,
            })
    }

    /// Persist a snapshot; failures are logged, never returned
    pub fn save(&self, state: SessionState) {
        if let Err(e) = self.try_save(state) {
            tracing::warn!("Session not saved: {}", e);
        }
    }

    /// Persist a snapshot after stripping `reference.locus`
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the backend rejects the write.
    pub fn try_save(&self, state: SessionState) -> Result<(), PersistenceError> {
        let Some(backend) = &self.backend else {
            tracing::debug!("Non-persistent session, save skipped");
            return Ok(());
        };

        let state = state.normalized();
        backend
            .set_item(&self.key, state.into_value())
            .map_err(|source| PersistenceError::Store {
                key: self.key.clone(),
                source,
            })?;

        tracing::debug!(key = %self.key, "Session saved");
        Ok(())
    }

    /// Forget the stored session
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the backend rejects the write.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        backend
            .set_item(&self.key, Value::Null)
            .map_err(|source| PersistenceError::Store {
                key: self.key.clone(),
                source,
            })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::non_persistent()
    }
}
