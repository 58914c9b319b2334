//! Error types for protected URL resolution

use crate::coordinator::ProtectedField;
use igv_uri::{ObjectIdentifier, UriError};

/// Rejection from the host presigner
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresignError {
    /// Caller may not read the object
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other presigner failure
    #[error("presign failed: {0}")]
    Failed(String),
}

/// Resolution of a load configuration failed
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// A flagged URL could not be classified; no presign call was made
    #[error("{field}: {source}")]
    Malformed {
        /// Field holding the URL
        field: ProtectedField,
        /// Classification failure
        #[source]
        source: UriError,
    },

    /// A presign call rejected; carries the first rejection
    #[error("could not resolve {identifier} ({field}): {source}")]
    ResolutionFailed {
        /// Field whose presign call failed
        field: ProtectedField,
        /// Identifier sent to the presigner
        identifier: ObjectIdentifier,
        /// Presigner rejection
        #[source]
        source: PresignError,
    },
}

impl ResolveError {
    /// Field that caused the failure
    #[inline]
    #[must_use]
    pub fn field(&self) -> ProtectedField {
        match self {
            Self::Malformed { field, .. } | Self::ResolutionFailed { field, .. } => *field,
        }
    }

    /// Check if the failure happened before any presign call
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
