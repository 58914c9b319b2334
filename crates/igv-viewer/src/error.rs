//! Error types for the viewer lifecycle

use igv_resolver::ResolveError;
use igv_uri::UriError;

/// Failure reported by the visualization engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Instance could not be initialized
    #[error("initialization failed: {0}")]
    Init(String),

    /// Reference or track could not be loaded
    #[error("load failed: {0}")]
    Load(String),

    /// Instance was already destroyed
    #[error("instance destroyed")]
    Destroyed,
}

impl EngineError {
    /// Create init error
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Create load error
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }
}

/// What the user was doing when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Mounting the viewer
    Mount,
    /// Loading a reference genome
    Reference,
    /// Adding a track
    Track,
}

/// Viewer lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Form input rejected before resolution
    #[error("invalid input: {0}")]
    Validation(#[from] UriError),

    /// Protected URLs could not be resolved
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// Engine failed to create the instance
    #[error("could not create viewer: {0}")]
    InstanceCreation(#[source] EngineError),

    /// Engine failed on a live instance
    #[error("viewer error: {0}")]
    Engine(#[source] EngineError),

    /// No live instance to act on
    #[error("viewer is not live")]
    NotLive,

    /// Host disabled the viewer
    #[error("viewer is disabled")]
    Disabled,
}

impl ViewerError {
    /// Check if the host should show this error to the user
    #[inline]
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Title of the dismissible notification for this error
    #[must_use]
    pub fn notification_title(&self, operation: Operation) -> &'static str {
        match (self, operation) {
            (Self::InstanceCreation(_), _) | (_, Operation::Mount) => "Viewer Error",
            (_, Operation::Reference) => "Reference Error",
            (_, Operation::Track) => "Track Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use igv_resolver::{PresignError, ProtectedField};
    use igv_uri::ObjectIdentifier;

    #[test]
    fn notification_titles() {
        let err = ViewerError::Resolution(ResolveError::ResolutionFailed {
            field: ProtectedField::TrackUrl(0),
            identifier: ObjectIdentifier::new("s3", "b", "k").unwrap(),
            source: PresignError::NotFound("k".to_string()),
        });
        assert_eq!(err.notification_title(Operation::Track), "Track Error");
        assert_eq!(err.notification_title(Operation::Reference), "Reference Error");
        assert_eq!(err.notification_title(Operation::Mount), "Viewer Error");

        let err = ViewerError::InstanceCreation(EngineError::init("no container"));
        assert_eq!(err.notification_title(Operation::Reference), "Viewer Error");
    }

    #[test]
    fn disabled_is_silent() {
        assert!(!ViewerError::Disabled.is_user_visible());
        assert!(ViewerError::NotLive.is_user_visible());
        assert!(ViewerError::Engine(EngineError::Destroyed).is_user_visible());
    }

    #[test]
    fn resolution_message_names_cause() {
        let err = ViewerError::Resolution(ResolveError::ResolutionFailed {
            field: ProtectedField::ReferenceFasta,
            identifier: ObjectIdentifier::new("s3", "refs", "hg.fa").unwrap(),
            source: PresignError::AccessDenied("refs/hg.fa".to_string()),
        });
        let msg = err.to_string();
        assert!(msg.contains("s3://refs/hg.fa"));
        assert!(msg.contains("access denied"));
    }
}
