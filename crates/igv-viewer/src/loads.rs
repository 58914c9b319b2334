//! Reference and track loads on the live instance
//!
//! A reference load takes a fresh load generation before resolving; a track
//! load joins the current one. A completion whose generation was overtaken by
//! a newer reference load or an unmount reports [`LoadOutcome::Superseded`]
//! without touching the instance or the stored session.

use crate::controller::ViewerController;
use crate::engine::{ReferenceLoad, ViewerHandle};
use crate::error::ViewerError;
use crate::forms::{ReferenceRequest, TrackForm};
use crate::observer::capture_session;
use igv_session::LoadConfiguration;
use igv_uri::validators::validate_min_len;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Result of a load operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Applied to the instance and persisted
    Loaded,
    /// A newer load or an unmount overtook this one
    Superseded,
}

#[derive(Clone, Copy)]
struct LoadTicket {
    mount: u64,
    load: u64,
}

impl ViewerController {
    fn begin_load(&self, supersede: bool) -> Result<(Arc<dyn ViewerHandle>, LoadTicket), ViewerError> {
        let handle = self.get_browser().ok_or(ViewerError::NotLive)?;
        let load = if supersede {
            self.inner.load_generation.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.inner.load_generation.load(Ordering::SeqCst)
        };
        let ticket = LoadTicket {
            mount: self.inner.mount_generation.load(Ordering::SeqCst),
            load,
        };
        Ok((handle, ticket))
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        self.inner.mount_generation.load(Ordering::SeqCst) == ticket.mount
            && self.inner.load_generation.load(Ordering::SeqCst) == ticket.load
    }

    /// Report `error` only if no newer load or unmount has overtaken `ticket`
    fn fail_load(
        &self,
        ticket: LoadTicket,
        what: &str,
        error: ViewerError,
    ) -> Result<LoadOutcome, ViewerError> {
        if self.is_current(ticket) {
            tracing::error!("{} load failed: {}", what, error);
            Err(error)
        } else {
            tracing::warn!(load = ticket.load, "Discarding failure of superseded {} load: {}", what, error);
            Ok(LoadOutcome::Superseded)
        }
    }

    /// Load a catalog genome or a custom reference into the live instance
    ///
    /// Custom references are validated, then their FASTA and index are
    /// presigned concurrently. On success the session is saved and the
    /// title updated.
    ///
    /// # Errors
    /// - [`ViewerError::NotLive`] without a live instance
    /// - [`ViewerError::Validation`] for invalid form input
    /// - [`ViewerError::Resolution`] if presigning failed
    /// - [`ViewerError::Engine`] if the engine rejected the reference
    pub async fn load_reference(&self, request: ReferenceRequest) -> Result<LoadOutcome, ViewerError> {
        let target = match request {
            ReferenceRequest::Catalog(id) => {
                validate_min_len("genome", &id, 1)?;
                ReferenceLoad::Genome(id)
            }
            ReferenceRequest::Custom(form) => ReferenceLoad::Custom(form.into_spec()?),
        };
        let (handle, ticket) = self.begin_load(true)?;

        let target = match target {
            ReferenceLoad::Custom(spec) => {
                let config = LoadConfiguration::new().with_reference(spec);
                match self.inner.resolver.resolve(&config).await {
                    Ok(resolved) => ReferenceLoad::Custom(resolved.reference.unwrap_or_default()),
                    Err(e) => return self.fail_load(ticket, "reference", ViewerError::Resolution(e)),
                }
            }
            genome => genome,
        };

        if !self.is_current(ticket) {
            tracing::warn!(load = ticket.load, "Discarding superseded reference load");
            return Ok(LoadOutcome::Superseded);
        }

        tracing::info!(reference = ?target, "Loading reference");
        if let Err(e) = handle.load_reference(target).await {
            return self.fail_load(ticket, "reference", ViewerError::Engine(e));
        }

        if !self.is_current(ticket) {
            tracing::warn!(load = ticket.load, "Reference loaded after being superseded");
            return Ok(LoadOutcome::Superseded);
        }
        capture_session(handle.as_ref(), self.store());
        self.inner.title.sync(handle.as_ref());
        Ok(LoadOutcome::Loaded)
    }

    /// Validate, presign and add a track to the live instance
    ///
    /// Concurrent track loads do not supersede each other. Failures of a load
    /// that was overtaken are reported as [`LoadOutcome::Superseded`].
    ///
    /// # Errors
    /// - [`ViewerError::NotLive`] without a live instance
    /// - [`ViewerError::Validation`] for invalid form input
    /// - [`ViewerError::Resolution`] if presigning failed
    /// - [`ViewerError::Engine`] if the engine rejected the track
    pub async fn load_track(&self, form: TrackForm) -> Result<LoadOutcome, ViewerError> {
        let spec = form.into_spec()?;
        let (handle, ticket) = self.begin_load(false)?;

        let config = LoadConfiguration::new().with_track(spec);
        let track = match self.inner.resolver.resolve(&config).await {
            Ok(resolved) => resolved.tracks.into_iter().next().unwrap_or_default(),
            Err(e) => return self.fail_load(ticket, "track", ViewerError::Resolution(e)),
        };

        if !self.is_current(ticket) {
            tracing::warn!(load = ticket.load, "Discarding superseded track load");
            return Ok(LoadOutcome::Superseded);
        }

        tracing::info!(track = %track.name, "Loading track");
        if let Err(e) = handle.load_track(track).await {
            return self.fail_load(ticket, "track", ViewerError::Engine(e));
        }

        if !self.is_current(ticket) {
            tracing::warn!(load = ticket.load, "Track loaded after being superseded");
            return Ok(LoadOutcome::Superseded);
        }
        capture_session(handle.as_ref(), self.store());
        Ok(LoadOutcome::Loaded)
    }
}
