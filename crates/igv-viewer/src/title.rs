//! Title Synchronizer

use crate::engine::ViewerHandle;
use crate::handlers::TitleSetter;
use std::fmt;
use std::sync::Arc;

/// Render the title template
#[must_use]
pub fn format_title(app_name: &str, reference_id: &str) -> String {
    format!("{app_name} | {reference_id}")
}

/// Forwards the loaded reference identity to the host's title capability
#[derive(Clone)]
pub struct TitleSync {
    setter: Option<Arc<dyn TitleSetter>>,
    app_name: String,
}

impl fmt::Debug for TitleSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleSync")
            .field("enabled", &self.setter.is_some())
            .field("app_name", &self.app_name)
            .finish()
    }
}

impl TitleSync {
    /// Create synchronizer; `None` makes every sync a no-op
    #[must_use]
    pub fn new(setter: Option<Arc<dyn TitleSetter>>, app_name: impl Into<String>) -> Self {
        Self {
            setter,
            app_name: app_name.into(),
        }
    }

    /// Check if the host supplied a title capability
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.setter.is_some()
    }

    /// Push the handle's current reference identity; returns the title sent
    pub fn sync(&self, handle: &dyn ViewerHandle) -> Option<String> {
        let setter = self.setter.as_ref()?;
        let Some(id) = handle.genome_id() else {
            tracing::debug!("No reference loaded, title unchanged");
            return None;
        };
        let title = format_title(&self.app_name, &id);
        setter.set_title(&title);
        tracing::debug!(%title, "Title updated");
        Some(title)
    }
}
