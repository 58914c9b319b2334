//! Error types for URI classification and validation

/// Errors raised while classifying or validating object-store URIs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
    /// No bucket/key could be extracted from the input
    #[error("malformed object identifier '{input}': {reason}")]
    MalformedIdentifier {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// A form field failed validation
    #[error("invalid {field}: {message}")]
    InvalidField {
        /// Field name as shown to the user
        field: String,
        /// Validation message
        message: String,
    },
}

impl UriError {
    /// Create malformed identifier error
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create field validation error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field the error belongs to, if it came from form validation
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidField { field, .. } => Some(field),
            Self::MalformedIdentifier { .. } => None,
        }
    }
}
