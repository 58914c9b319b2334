//! Viewer Lifecycle Controller
//!
//! Owns the one visualization instance for the widget's lifetime.
//!
//! ```text
//! Unmounted -> Creating -> Live -> Destroying -> Unmounted
//! ```
//!
//! Every await point is followed by a generation check. A completion that
//! belongs to a mount superseded by [`ViewerController::unmount`] is
//! discarded, and an instance created for it is destroyed instead of stored.

use crate::engine::{ContainerId, ViewerHandle, VisualizationEngine};
use crate::error::ViewerError;
use crate::handlers::HostHandlers;
use crate::observer::{SessionObserver, Subscription};
use crate::slot::BrowserSlot;
use crate::title::TitleSync;
use igv_resolver::{ResolveError, ResolverCoordinator};
use igv_session::{SessionStore, WidgetConfig};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// No instance
    #[default]
    Unmounted,
    /// Resolving the session and creating the instance
    Creating,
    /// Instance stored in the slot
    Live,
    /// Releasing the instance
    Destroying,
}

/// Result of [`ViewerController::mount`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// A new instance is live
    Created,
    /// Another mount is in progress or an instance is live
    AlreadyMounted,
    /// Unmounted while creating; nothing was stored
    Superseded,
}

pub(crate) struct Inner {
    pub(crate) engine: Arc<dyn VisualizationEngine>,
    pub(crate) resolver: ResolverCoordinator,
    pub(crate) observer: SessionObserver,
    pub(crate) title: TitleSync,
    pub(crate) enabled: bool,
    pub(crate) slot: BrowserSlot,
    pub(crate) state: Mutex<LifecycleState>,
    pub(crate) subscription: Mutex<Option<Subscription>>,
    pub(crate) mount_generation: AtomicU64,
    pub(crate) load_generation: AtomicU64,
}

impl Inner {
    pub(crate) fn store(&self) -> &SessionStore {
        self.observer.store()
    }
}

/// Creates, exposes and tears down the single viewer instance
///
/// Cheap to clone; clones share the same instance.
#[derive(Clone)]
pub struct ViewerController {
    pub(crate) inner: Arc<Inner>,
}

impl fmt::Debug for ViewerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerController")
            .field("state", &self.state())
            .field("enabled", &self.inner.enabled)
            .field("store", self.inner.store())
            .finish_non_exhaustive()
    }
}

impl ViewerController {
    /// Create controller from host capabilities and widget settings
    #[must_use]
    pub fn new(
        engine: Arc<dyn VisualizationEngine>,
        handlers: HostHandlers,
        config: &WidgetConfig,
    ) -> Self {
        let store = SessionStore::from_config(handlers.store.clone(), config);
        let enabled = handlers.enabled && config.enabled;
        if !store.is_persistent() {
            tracing::info!("No host store, session will not persist");
        }

        Self {
            inner: Arc::new(Inner {
                engine,
                resolver: ResolverCoordinator::new(handlers.presigner.clone()),
                observer: SessionObserver::new(store),
                title: TitleSync::new(handlers.title.clone(), config.app_name.as_str()),
                enabled,
                slot: BrowserSlot::new(),
                state: Mutex::new(LifecycleState::Unmounted),
                subscription: Mutex::new(None),
                mount_generation: AtomicU64::new(0),
                load_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.inner.state.lock()
    }

    /// Check if an instance is live
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state() == LifecycleState::Live
    }

    /// Check if the host enabled the viewer
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled
    }

    /// Read access to the live instance
    #[inline]
    #[must_use]
    pub fn slot(&self) -> &BrowserSlot {
        &self.inner.slot
    }

    /// Live instance, if any
    #[must_use]
    pub fn get_browser(&self) -> Option<Arc<dyn ViewerHandle>> {
        self.inner.slot.get_browser()
    }

    /// Session store used for restore and capture
    #[inline]
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.inner.store()
    }

    fn is_current_mount(&self, generation: u64) -> bool {
        self.inner.mount_generation.load(Ordering::SeqCst) == generation
    }

    /// Restore the persisted session and create the instance
    ///
    /// A second call while creating or live is a no-op. A stored session
    /// whose protected URLs cannot be classified is replaced by the default
    /// configuration. On failure the controller returns to
    /// [`LifecycleState::Unmounted`] with an empty slot and may be mounted
    /// again.
    ///
    /// # Errors
    /// - [`ViewerError::Disabled`] if the host disabled the viewer
    /// - [`ViewerError::Resolution`] if the presigner rejected a protected URL
    /// - [`ViewerError::InstanceCreation`] if the engine failed
    pub async fn mount(&self, container: &ContainerId) -> Result<MountOutcome, ViewerError> {
        if !self.inner.enabled {
            tracing::debug!("Viewer disabled, not mounting");
            return Err(ViewerError::Disabled);
        }

        let generation = {
            let mut state = self.inner.state.lock();
            if *state != LifecycleState::Unmounted {
                tracing::debug!(state = ?*state, "Mount ignored");
                return Ok(MountOutcome::AlreadyMounted);
            }
            *state = LifecycleState::Creating;
            self.inner.mount_generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        tracing::info!(container = container.as_str(), generation, "Mounting viewer");
        let config = self.store().load();

        let resolved = match self.inner.resolver.resolve(&config).await {
            Ok(resolved) => resolved,
            Err(e @ ResolveError::Malformed { .. }) => {
                tracing::warn!("Stored session cannot be resolved, starting from default: {}", e);
                self.store().default_configuration()
            }
            Err(e) => return self.abandon_mount(generation, ViewerError::Resolution(e)),
        };
        if !self.is_current_mount(generation) {
            tracing::warn!(generation, "Discarding stale session resolution");
            return Ok(MountOutcome::Superseded);
        }

        let handle = match self.inner.engine.create_instance(container, &resolved).await {
            Ok(handle) => handle,
            Err(e) => return self.abandon_mount(generation, ViewerError::InstanceCreation(e)),
        };

        {
            let mut state = self.inner.state.lock();
            if self.is_current_mount(generation) {
                self.inner.slot.set_browser(handle.clone());
                *self.inner.subscription.lock() = Some(self.inner.observer.attach(&handle));
                *state = LifecycleState::Live;
                drop(state);

                self.inner.title.sync(handle.as_ref());
                tracing::info!(generation, reference = ?handle.genome_id(), "Viewer live");
                return Ok(MountOutcome::Created);
            }
        }

        tracing::warn!(generation, "Destroying instance created after unmount");
        self.inner.engine.destroy_instance(handle).await;
        Ok(MountOutcome::Superseded)
    }

    fn abandon_mount(
        &self,
        generation: u64,
        error: ViewerError,
    ) -> Result<MountOutcome, ViewerError> {
        let mut state = self.inner.state.lock();
        if !self.is_current_mount(generation) {
            tracing::warn!(generation, "Discarding failure of superseded mount: {}", error);
            return Ok(MountOutcome::Superseded);
        }
        *state = LifecycleState::Unmounted;
        tracing::error!("Mount failed: {}", error);
        Err(error)
    }

    /// Detach listeners and destroy the instance
    ///
    /// Safe to call in any state. A mount still in flight is invalidated and
    /// its instance, if one is created later, is destroyed without being stored.
    pub async fn unmount(&self) {
        let (handle, subscription) = {
            let mut state = self.inner.state.lock();
            self.inner.mount_generation.fetch_add(1, Ordering::SeqCst);
            self.inner.load_generation.fetch_add(1, Ordering::SeqCst);

            let handle = self.inner.slot.take_browser();
            let subscription = self.inner.subscription.lock().take();
            if handle.is_some() {
                *state = LifecycleState::Destroying;
            } else if *state != LifecycleState::Destroying {
                *state = LifecycleState::Unmounted;
            }
            (handle, subscription)
        };

        let Some(handle) = handle else {
            tracing::debug!("Unmount with no live instance");
            return;
        };

        tracing::info!("Destroying viewer");
        if let Some(subscription) = subscription {
            subscription.detach();
        }
        self.inner.engine.destroy_instance(handle).await;
        *self.inner.state.lock() = LifecycleState::Unmounted;
    }
}
