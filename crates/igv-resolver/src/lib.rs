//! Protected URL resolution for IGV load configurations
//!
//! Finds every URL flagged as protected storage in a [`LoadConfiguration`],
//! exchanges each one for a short-lived URL through an injected
//! [`Presigner`], and writes the results back into their original positions.
//!
//! All presign calls for one configuration run concurrently; the result is
//! all-or-nothing.
//!
//! # Example
//!
//! ```rust
//! use igv_resolver::{presign_fn, ResolverCoordinator};
//! use igv_session::{LoadConfiguration, TrackSpec};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), igv_resolver::ResolveError> {
//! let presigner = presign_fn(|id| async move {
//!     Ok(format!("https://signed/{}", id.key()))
//! });
//! let coordinator = ResolverCoordinator::new(Arc::new(presigner));
//!
//! let config = LoadConfiguration::for_genome("hg38")
//!     .with_track(TrackSpec::new("sample", "s3://my-bucket/sample.bam").presigned());
//! let resolved = coordinator.resolve(&config).await?;
//! assert_eq!(resolved.tracks[0].url, "https://signed/sample.bam");
//! # Ok(())
//! # }
//! ```
//!
//! [`LoadConfiguration`]: igv_session::LoadConfiguration

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod coordinator;
mod error;
mod presign;

pub use coordinator::{collect_protected, resolve, ProtectedField, ResolverCoordinator};
pub use error::{PresignError, ResolveError};
pub use presign::{presign_fn, FnPresigner, Presigner, ResolvedUrl};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
