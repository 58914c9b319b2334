//! Visualization engine seam
//!
//! The engine is an external collaborator. This module only fixes the shape
//! of the calls the lifecycle makes into it.

use crate::error::EngineError;
use igv_session::{LoadConfiguration, ReferenceSpec, SessionState, TrackSpec};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// User-interaction events the engine emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerEvent {
    /// A track was removed
    TrackRemoved,
    /// A track was drag-reordered
    TrackDragEnd,
    /// The visible locus changed
    LocusChange,
    /// Track order changed
    TrackOrderChanged,
}

impl ViewerEvent {
    /// Engine event name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TrackRemoved => "trackremoved",
            Self::TrackDragEnd => "trackdragend",
            Self::LocusChange => "locuschange",
            Self::TrackOrderChanged => "trackorderchanged",
        }
    }
}

impl Display for ViewerEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener registration returned by [`ViewerHandle::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id
    #[inline]
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Listener invoked by the engine
pub type EventCallback = Arc<dyn Fn(ViewerEvent) + Send + Sync>;

/// Opaque host element the engine renders into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    /// Wrap a container id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Argument to [`ViewerHandle::load_reference`]
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceLoad {
    /// Catalog genome id such as `hg38`
    Genome(String),
    /// Custom reference with fetchable URLs
    Custom(ReferenceSpec),
}

/// One live visualization instance
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ViewerHandle: Send + Sync {
    /// Replace the loaded reference
    async fn load_reference(&self, reference: ReferenceLoad) -> Result<(), EngineError>;

    /// Add a track
    async fn load_track(&self, track: TrackSpec) -> Result<(), EngineError>;

    /// Current serializable state
    fn serialize_state(&self) -> SessionState;

    /// Identity of the loaded reference
    fn genome_id(&self) -> Option<String>;

    /// Register a listener
    fn on(&self, event: ViewerEvent, callback: EventCallback) -> SubscriptionId;

    /// Remove a listener; unknown ids are ignored
    fn off(&self, id: SubscriptionId);
}

/// Creates and destroys visualization instances
#[async_trait::async_trait]
pub trait VisualizationEngine: Send + Sync {
    /// Create an instance rendering `config` into `container`
    async fn create_instance(
        &self,
        container: &ContainerId,
        config: &LoadConfiguration,
    ) -> Result<Arc<dyn ViewerHandle>, EngineError>;

    /// Release an instance's resources
    async fn destroy_instance(&self, handle: Arc<dyn ViewerHandle>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        let names: Vec<_> = [
            ViewerEvent::TrackRemoved,
            ViewerEvent::TrackDragEnd,
            ViewerEvent::LocusChange,
            ViewerEvent::TrackOrderChanged,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(names, ["trackremoved", "trackdragend", "locuschange", "trackorderchanged"]);
    }
}
