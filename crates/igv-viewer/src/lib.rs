//! Viewer lifecycle for the IGV notebook widget
//!
//! Ties the persisted session, the resolver and the visualization engine
//! together around a single live instance.
//!
//! # Core Concepts
//!
//! - [`ViewerController`]: creates the instance once from the restored session,
//!   exposes it through a [`BrowserSlot`] and destroys it on unmount
//! - [`SessionObserver`]: saves a snapshot on every user mutation event
//! - [`TitleSync`]: pushes `"<app> | <reference>"` to the host
//! - [`ReferenceForm`] / [`TrackForm`]: validated user input for loads
//!
//! The engine itself is external and reached through [`VisualizationEngine`]
//! and [`ViewerHandle`].

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod controller;
mod engine;
mod error;
mod forms;
mod handlers;
mod loads;
mod observer;
mod slot;
mod title;

pub use controller::{LifecycleState, MountOutcome, ViewerController};
pub use engine::{
    ContainerId, EventCallback, ReferenceLoad, SubscriptionId, ViewerEvent, ViewerHandle,
    VisualizationEngine,
};
pub use error::{EngineError, Operation, ViewerError};
pub use forms::{ReferenceForm, ReferenceRequest, TrackForm, REFERENCE_NAME_MIN, TRACK_NAME_MIN};
pub use handlers::{HostHandlers, TitleSetter};
pub use loads::LoadOutcome;
pub use observer::{capture_session, SessionObserver, Subscription, OBSERVED_EVENTS};
pub use slot::BrowserSlot;
pub use title::{format_title, TitleSync};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
