//! Holder of the single live viewer instance

use crate::engine::ViewerHandle;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Owned optional handle shared by read with every dependent component
///
/// Only [`ViewerController`](crate::ViewerController) writes to the slot;
/// the setters are crate-private.
#[derive(Default)]
pub struct BrowserSlot {
    handle: Mutex<Option<Arc<dyn ViewerHandle>>>,
}

impl fmt::Debug for BrowserSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSlot")
            .field("occupied", &self.is_occupied())
            .finish()
    }
}

impl BrowserSlot {
    /// Create empty slot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live instance, if any
    #[must_use]
    pub fn get_browser(&self) -> Option<Arc<dyn ViewerHandle>> {
        self.handle.lock().clone()
    }

    /// Check if an instance is stored
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.handle.lock().is_some()
    }

    pub(crate) fn set_browser(&self, handle: Arc<dyn ViewerHandle>) -> Option<Arc<dyn ViewerHandle>> {
        self.handle.lock().replace(handle)
    }

    pub(crate) fn take_browser(&self) -> Option<Arc<dyn ViewerHandle>> {
        self.handle.lock().take()
    }
}
