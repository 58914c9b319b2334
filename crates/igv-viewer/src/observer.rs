//! Session Mutation Observer
//!
//! Registers one listener per mutation event when an instance goes live.
//! Every event triggers a full snapshot save; events are not coalesced.

use crate::engine::{SubscriptionId, ViewerEvent, ViewerHandle};
use igv_session::SessionStore;
use std::sync::{Arc, Weak};

/// Events that cause a session save
pub const OBSERVED_EVENTS: [ViewerEvent; 4] = [
    ViewerEvent::TrackRemoved,
    ViewerEvent::TrackDragEnd,
    ViewerEvent::LocusChange,
    ViewerEvent::TrackOrderChanged,
];

/// Serialize `handle`, drop `reference.locus` and persist
///
/// Persistence failures are logged by the store and never returned.
pub fn capture_session(handle: &dyn ViewerHandle, store: &SessionStore) {
    let mut state = handle.serialize_state();
    if state.strip_reference_locus() {
        tracing::debug!("Dropped reference.locus from snapshot");
    }
    store.save(state);
}

/// Saves the session whenever the user mutates the view
#[derive(Debug, Clone)]
pub struct SessionObserver {
    store: SessionStore,
}

impl SessionObserver {
    /// Create observer persisting through `store`
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Store snapshots are written to
    #[inline]
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Register listeners for [`OBSERVED_EVENTS`] on `handle`
    ///
    /// Listeners hold the handle weakly and stop saving once it is dropped.
    #[must_use = "dropping the subscription leaves listeners registered until detach"]
    pub fn attach(&self, handle: &Arc<dyn ViewerHandle>) -> Subscription {
        let weak = Arc::downgrade(handle);
        let ids = OBSERVED_EVENTS
            .iter()
            .map(|&event| {
                let weak = weak.clone();
                let store = self.store.clone();
                handle.on(
                    event,
                    Arc::new(move |fired: ViewerEvent| {
                        let Some(handle) = weak.upgrade() else {
                            return;
                        };
                        tracing::debug!(event = %fired, "Capturing session");
                        capture_session(handle.as_ref(), &store);
                    }),
                )
            })
            .collect();

        tracing::debug!("Session observer attached");
        Subscription { handle: weak, ids }
    }
}

/// Listener registrations on one instance
#[derive(Debug)]
pub struct Subscription {
    handle: Weak<dyn ViewerHandle>,
    ids: Vec<SubscriptionId>,
}

impl Subscription {
    /// Registered listener ids
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[SubscriptionId] {
        &self.ids
    }

    /// Remove every listener from the instance
    pub fn detach(self) {
        if let Some(handle) = self.handle.upgrade() {
            for id in self.ids {
                handle.off(id);
            }
            tracing::debug!("Session observer detached");
        }
    }
}
