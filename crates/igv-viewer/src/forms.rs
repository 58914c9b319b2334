//! User-entered reference and track forms
//!
//! Validation runs at data-entry time, before any URI reaches the resolver.

use igv_session::{ReferenceSpec, TrackSpec};
use igv_uri::validators::{validate_min_len, validate_optional_s3_uri, validate_s3_uri};
use igv_uri::{ensure_scheme, UriError};

/// Minimum length of a reference name
pub const REFERENCE_NAME_MIN: usize = 3;

/// Minimum length of a track name
pub const TRACK_NAME_MIN: usize = 5;

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Custom reference from object storage
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceForm {
    /// Display name and id
    pub name: String,
    /// FASTA location
    pub reference_uri: String,
    /// FASTA index location
    pub index_uri: Option<String>,
}

impl ReferenceForm {
    /// Create form without an index
    #[must_use]
    pub fn new(name: impl Into<String>, reference_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference_uri: reference_uri.into(),
            index_uri: None,
        }
    }

    /// With index URI
    #[inline]
    #[must_use]
    pub fn with_index(mut self, index_uri: impl Into<String>) -> Self {
        self.index_uri = Some(index_uri.into());
        self
    }

    /// Check every field
    ///
    /// # Errors
    /// Returns [`UriError::InvalidField`] for the first invalid field.
    pub fn validate(&self) -> Result<(), UriError> {
        validate_min_len("name", &self.name, REFERENCE_NAME_MIN)?;
        validate_s3_uri("referenceURI", &self.reference_uri)?;
        validate_optional_s3_uri("indexURI", self.index_uri.as_deref())
    }

    /// Validate and build a reference flagged for presigning
    ///
    /// # Errors
    /// See [`ReferenceForm::validate`].
    pub fn into_spec(self) -> Result<ReferenceSpec, UriError> {
        self.validate()?;
        let mut spec = ReferenceSpec::new(ensure_scheme(&self.reference_uri)).named(self.name);
        if let Some(index) = non_empty(self.index_uri.as_deref()) {
            spec = spec.with_index(ensure_scheme(index));
        }
        Ok(spec.presigned())
    }
}

/// Track from object storage
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackForm {
    /// Display name
    pub name: String,
    /// Data location
    pub track_uri: String,
    /// Index location
    pub index_uri: Option<String>,
}

impl TrackForm {
    /// Create form without an index
    #[must_use]
    pub fn new(name: impl Into<String>, track_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            track_uri: track_uri.into(),
            index_uri: None,
        }
    }

    /// With index URI
    #[inline]
    #[must_use]
    pub fn with_index(mut self, index_uri: impl Into<String>) -> Self {
        self.index_uri = Some(index_uri.into());
        self
    }

    /// Check every field
    ///
    /// # Errors
    /// Returns [`UriError::InvalidField`] for the first invalid field.
    pub fn validate(&self) -> Result<(), UriError> {
        validate_min_len("name", &self.name, TRACK_NAME_MIN)?;
        validate_s3_uri("trackURI", &self.track_uri)?;
        validate_optional_s3_uri("indexURI", self.index_uri.as_deref())
    }

    /// Validate and build a track flagged for presigning
    ///
    /// # Errors
    /// See [`TrackForm::validate`].
    pub fn into_spec(self) -> Result<TrackSpec, UriError> {
        self.validate()?;
        let mut spec = TrackSpec::new(self.name, ensure_scheme(&self.track_uri));
        if let Some(index) = non_empty(self.index_uri.as_deref()) {
            spec = spec.with_index(ensure_scheme(index));
        }
        Ok(spec.presigned())
    }
}

/// Reference the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceRequest {
    /// Catalog genome id
    Catalog(String),
    /// Custom reference form
    Custom(ReferenceForm),
}
