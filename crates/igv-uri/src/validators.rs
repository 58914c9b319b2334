//! Data-entry validation for object-store URIs
//!
//! These checks run when the user submits a form, before any identifier is
//! handed to the presigner.

use crate::error::UriError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Message shown for a URI that fails [`validate_s3_uri`]
pub const S3_URI_MESSAGE: &str = "Must be a valid S3 URI of the form: s3://bucket/path/to/object";

static S3_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:s3://)?([a-z0-9.-]{1,})/.*$").expect("S3 URI pattern is valid"));

/// Check that `value` is an `s3://bucket/key` or `bucket/key` string
///
/// # Errors
/// Returns [`UriError::InvalidField`] naming `field`.
pub fn validate_s3_uri(field: &str, value: &str) -> Result<(), UriError> {
    if S3_URI.is_match(value) {
        Ok(())
    } else {
        Err(UriError::invalid_field(field, S3_URI_MESSAGE))
    }
}

/// Like [`validate_s3_uri`], but an absent or empty value is accepted
///
/// # Errors
/// Returns [`UriError::InvalidField`] naming `field`.
pub fn validate_optional_s3_uri(field: &str, value: Option<&str>) -> Result<(), UriError> {
    match value {
        None | Some("") => Ok(()),
        Some(v) => validate_s3_uri(field, v),
    }
}

/// Check that `value` has at least `min` characters
///
/// # Errors
/// Returns [`UriError::InvalidField`] naming `field`.
pub fn validate_min_len(field: &str, value: &str, min: usize) -> Result<(), UriError> {
    if value.chars().count() >= min {
        Ok(())
    } else {
        Err(UriError::invalid_field(
            field,
            format!("String must contain at least {min} character(s)"),
        ))
    }
}
