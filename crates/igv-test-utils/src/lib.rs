//! Testing utilities for the IGV widget workspace
//!
//! Shared fakes for the host capabilities and the visualization engine.

#![allow(missing_docs)]

mod engine;
mod presigner;

pub use engine::{FakeEngine, FakeHandle};
pub use presigner::ScriptedPresigner;

use igv_session::{
    KeyValueStore, LoadConfiguration, MemoryStore, StoreError, TrackSpec, WidgetConfig,
};
use igv_viewer::{HostHandlers, TitleSetter, ViewerController};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Store whose every call fails
#[derive(Debug, Default)]
pub struct FailingStore {
    attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FailingStore {
    fn get_item(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("storage offline".to_string()))
    }

    fn set_item(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }
}

/// Title setter that remembers every title
#[derive(Debug, Default)]
pub struct RecordingTitle {
    titles: Mutex<Vec<String>>,
}

impl RecordingTitle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.titles.lock().last().cloned()
    }
}

impl TitleSetter for RecordingTitle {
    fn set_title(&self, title: &str) {
        self.titles.lock().push(title.to_string());
    }
}

/// Everything a test needs to drive a controller
pub struct Harness {
    pub presigner: Arc<ScriptedPresigner>,
    pub store: Arc<MemoryStore>,
    pub title: Arc<RecordingTitle>,
    pub engine: Arc<FakeEngine>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_presigner(ScriptedPresigner::new())
    }

    pub fn with_presigner(presigner: ScriptedPresigner) -> Self {
        Self {
            presigner: Arc::new(presigner),
            store: Arc::new(MemoryStore::new()),
            title: Arc::new(RecordingTitle::new()),
            engine: Arc::new(FakeEngine::new()),
        }
    }

    /// Controller over this harness with default widget settings
    pub fn controller(&self) -> ViewerController {
        ViewerController::new(self.engine.clone(), self.handlers(), &WidgetConfig::default())
    }

    pub fn handlers(&self) -> HostHandlers {
        HostHandlers::new(self.presigner.clone())
            .with_store(self.store.clone())
            .with_title_setter(self.title.clone())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration with one presigned track and index
pub fn sample_track_config() -> LoadConfiguration {
    LoadConfiguration::for_genome("hg38").with_track(
        TrackSpec::new("sample", "s3://my-bucket/sample.bam")
            .with_index("s3://my-bucket/sample.bam.bai")
            .presigned(),
    )
}

/// Write `config` to `store` the way a previous session would have
pub fn seed_session(store: &MemoryStore, config: &LoadConfiguration) {
    let value = serde_json::to_value(config).unwrap();
    store
        .set_item(igv_session::store::DEFAULT_SESSION_KEY, value)
        .unwrap();
}
