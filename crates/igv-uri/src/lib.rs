//! Object-store URI handling for the IGV widget
//!
//! Recognizes references to protected storage and reduces every accepted
//! addressing style to one canonical `scheme://bucket/key` form.
//!
//! # Core Concepts
//!
//! - [`ObjectIdentifier`]: canonical identifier handed to the presigner
//! - [`Classifier`]: maps scheme-qualified, virtual-host and path-style URLs to an identifier
//! - [`validators`]: data-entry checks run before any resolution is attempted
//!
//! # Example
//!
//! ```rust
//! use igv_uri::classify;
//!
//! let a = classify("https://bucket1.s3.amazonaws.com/key1").unwrap();
//! let b = classify("https://s3.amazonaws.com/bucket1/key1").unwrap();
//! let c = classify("s3://bucket1/key1").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(b, c);
//! assert_eq!(c.to_string(), "s3://bucket1/key1");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod identifier;
pub mod validators;

pub use error::UriError;
pub use identifier::{
    classify, ensure_scheme, looks_like_bare_identifier, Classifier, ObjectIdentifier,
    DEFAULT_SCHEME, DEFAULT_SERVICE_LABEL,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
