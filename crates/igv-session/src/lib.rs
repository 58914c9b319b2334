//! Session model and persistence for the IGV widget
//!
//! - [`LoadConfiguration`]: what the viewer should display, with a typed view of
//!   the reference and track fields this workspace rewrites and an opaque
//!   pass-through for everything else
//! - [`SessionState`]: serialized snapshot of a live viewer
//! - [`SessionStore`]: adapter over the host's key/value capability
//! - [`WidgetConfig`]: widget settings, loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use igv_session::{MemoryStore, SessionState, SessionStore};
//! use std::sync::Arc;
//!
//! let store = SessionStore::new(Arc::new(MemoryStore::new()));
//! assert_eq!(store.load().genome.as_deref(), Some("hg38"));
//!
//! let state = SessionState::from_value(serde_json::json!({
//!     "genome": "mm10",
//!     "tracks": [{ "name": "genes", "url": "https://example.org/genes.bed" }]
//! }));
//! store.save(state);
//! assert_eq!(store.load().genome.as_deref(), Some("mm10"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod file_store;
pub mod settings;
pub mod store;
pub mod types;

pub use error::{ConfigError, PersistenceError, StoreError};
pub use file_store::JsonFileStore;
pub use settings::WidgetConfig;
pub use store::{KeyValueStore, MemoryStore, SessionStore};
pub use types::{
    LoadConfiguration, ReferenceSpec, SessionState, TrackSpec, DEFAULT_GENOME, KNOWN_GENOMES,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
