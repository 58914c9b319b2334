//! Capabilities injected by the host application

use igv_resolver::Presigner;
use igv_session::KeyValueStore;
use std::fmt;
use std::sync::Arc;

/// Updates a user-visible label outside the widget
pub trait TitleSetter: Send + Sync {
    /// Show `title`
    fn set_title(&self, title: &str);
}

impl<F> TitleSetter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn set_title(&self, title: &str) {
        self(title);
    }
}

/// Everything the host hands to the widget
#[derive(Clone)]
pub struct HostHandlers {
    /// Presign capability
    pub presigner: Arc<dyn Presigner>,
    /// Persistent key/value store; `None` runs without persistence
    pub store: Option<Arc<dyn KeyValueStore>>,
    /// Title capability; `None` disables title sync
    pub title: Option<Arc<dyn TitleSetter>>,
    /// When false the viewer is never created
    pub enabled: bool,
}

impl fmt::Debug for HostHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHandlers")
            .field("store", &self.store.is_some())
            .field("title", &self.title.is_some())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl HostHandlers {
    /// Handlers with only a presigner
    #[must_use]
    pub fn new(presigner: Arc<dyn Presigner>) -> Self {
        Self {
            presigner,
            store: None,
            title: None,
            enabled: true,
        }
    }

    /// With key/value store
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// With title setter
    #[inline]
    #[must_use]
    pub fn with_title_setter(mut self, title: Arc<dyn TitleSetter>) -> Self {
        self.title = Some(title);
        self
    }

    /// With enabled flag
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
