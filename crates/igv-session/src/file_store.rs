//! JSON-file backed key/value store
//!
//! Keeps all keys in one JSON object on disk. Every write rewrites the file.

use crate::error::StoreError;
use crate::store::KeyValueStore;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value store persisted as a single JSON object
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create store over `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StoreError::io_error(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn write_all(&self, items: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
        }
        let text = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, text).map_err(|e| StoreError::io_error(&self.path, e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value);
        self.write_all(&items)
    }
}
