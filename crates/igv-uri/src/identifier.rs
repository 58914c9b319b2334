//! Canonical object identifiers
//!
//! Provides [`ObjectIdentifier`] and the [`Classifier`] that produces it.
//!
//! Three input shapes are accepted for the same underlying object:
//! - scheme-qualified: `s3://bucket/key`
//! - virtual-host style: `https://bucket.s3.amazonaws.com/key`
//! - path style: `https://s3.amazonaws.com/bucket/key`
//!
//! Bare `bucket/key` strings are treated as scheme-qualified with the scheme missing.

use crate::error::UriError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Scheme of canonical identifiers
pub const DEFAULT_SCHEME: &str = "s3";

/// Host label that marks an object-store endpoint
pub const DEFAULT_SERVICE_LABEL: &str = "s3";

static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9.-]+/.*$").expect("bare identifier pattern is valid"));

/// Canonical `scheme://bucket/key` identifier of a protected object
///
/// Two identifiers are equal iff their canonical strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectIdentifier {
    scheme: String,
    bucket: String,
    key: String,
}

impl ObjectIdentifier {
    /// Create identifier from its parts
    ///
    /// # Errors
    /// Returns [`UriError::MalformedIdentifier`] if the bucket is empty or
    /// contains a `/`.
    pub fn new(
        scheme: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, UriError> {
        let scheme = scheme.into();
        let bucket = bucket.into();
        let key = key.into();

        if bucket.is_empty() {
            return Err(UriError::malformed(
                format!("{scheme}://{bucket}/{key}"),
                "missing bucket",
            ));
        }
        if bucket.contains('/') {
            return Err(UriError::malformed(
                format!("{scheme}://{bucket}/{key}"),
                "bucket contains '/'",
            ));
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            bucket,
            key,
        })
    }

    /// Identifier scheme (normally `s3`)
    #[inline]
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Bucket name
    #[inline]
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key (may be empty for a bucket root)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.key)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        classify(s)
    }
}

impl TryFrom<String> for ObjectIdentifier {
    type Error = UriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (scheme, rest) = value
            .split_once("://")
            .ok_or_else(|| UriError::malformed(value.as_str(), "missing scheme"))?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        Self::new(scheme, bucket, key)
    }
}

impl From<ObjectIdentifier> for String {
    fn from(id: ObjectIdentifier) -> Self {
        id.to_string()
    }
}

/// Maps URLs in any accepted shape to an [`ObjectIdentifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    scheme: String,
    service_label: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            service_label: DEFAULT_SERVICE_LABEL.to_string(),
        }
    }
}

impl Classifier {
    /// Create classifier for `s3` identifiers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With canonical scheme
    #[inline]
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into().to_ascii_lowercase();
        self
    }

    /// With endpoint service label (`s3` in `bucket.s3.amazonaws.com`)
    #[inline]
    #[must_use]
    pub fn with_service_label(mut self, label: impl Into<String>) -> Self {
        self.service_label = label.into().to_ascii_lowercase();
        self
    }

    /// Canonical scheme
    #[inline]
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Classify a URL into its canonical identifier
    ///
    /// # Errors
    /// Returns [`UriError::MalformedIdentifier`] when no bucket can be extracted.
    pub fn classify(&self, url: &str) -> Result<ObjectIdentifier, UriError> {
        let input = url.trim();
        if input.is_empty() {
            return Err(UriError::malformed(url, "empty input"));
        }

        match input.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case(&self.scheme) => {
                self.from_canonical(url, rest)
            }
            Some((scheme, rest))
                if scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("http") =>
            {
                self.from_endpoint(url, rest)
            }
            Some((scheme, _)) => Err(UriError::malformed(
                url,
                format!("unsupported scheme '{scheme}'"),
            )),
            None if self.is_endpoint_host(first_segment(input)) => self.from_endpoint(url, input),
            None if looks_like_bare_identifier(input) => self.from_canonical(url, input),
            None => Err(UriError::malformed(url, "expected bucket/key")),
        }
    }

    /// Prepend the canonical scheme when absent
    #[must_use]
    pub fn ensure_scheme(&self, s: &str) -> String {
        let prefix = format!("{}://", self.scheme);
        if s.starts_with(&prefix) {
            s.to_string()
        } else {
            format!("{prefix}{s}")
        }
    }

    fn from_canonical(&self, input: &str, rest: &str) -> Result<ObjectIdentifier, UriError> {
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(UriError::malformed(input, "missing bucket"));
        }
        ObjectIdentifier::new(self.scheme.as_str(), bucket, key)
    }

    fn from_endpoint(&self, input: &str, rest: &str) -> Result<ObjectIdentifier, UriError> {
        // Presigned URLs carry their signature in the query string.
        let rest = strip_query_and_fragment(rest);
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = host_of(authority);

        let Some(service_idx) = self.service_label_index(&host) else {
            if host.is_empty() {
                return self.path_style(input, path);
            }
            return Err(UriError::malformed(
                input,
                format!("'{host}' is not an object-store endpoint"),
            ));
        };

        if service_idx == 0 {
            self.path_style(input, path)
        } else {
            let labels: Vec<&str> = host.split('.').collect();
            let bucket = labels[..service_idx].join(".");
            ObjectIdentifier::new(self.scheme.as_str(), bucket, path)
        }
    }

    fn path_style(&self, input: &str, path: &str) -> Result<ObjectIdentifier, UriError> {
        let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
        if bucket.is_empty() {
            return Err(UriError::malformed(input, "missing bucket"));
        }
        ObjectIdentifier::new(self.scheme.as_str(), bucket, key)
    }

    /// Index of the service label among the host labels, if the host is an endpoint
    fn service_label_index(&self, host: &str) -> Option<usize> {
        let labels: Vec<&str> = host.split('.').collect();
        let dashed = format!("{}-", self.service_label);
        labels
            .iter()
            .rposition(|label| *label == self.service_label || label.starts_with(&dashed))
            // the service label must be followed by a domain
            .filter(|idx| idx + 1 < labels.len())
    }

    fn is_endpoint_host(&self, segment: &str) -> bool {
        self.service_label_index(&host_of(segment)).is_some()
    }
}

/// Classify a URL with the default `s3` classifier
///
/// # Errors
/// Returns [`UriError::MalformedIdentifier`] when no bucket can be extracted.
pub fn classify(url: &str) -> Result<ObjectIdentifier, UriError> {
    Classifier::default().classify(url)
}

/// Check whether `s` is a `bucket/key` string lacking a scheme prefix
#[must_use]
pub fn looks_like_bare_identifier(s: &str) -> bool {
    !s.contains("://") && BARE_IDENTIFIER.is_match(s)
}

/// Prepend `s3://` when absent
#[must_use]
pub fn ensure_scheme(s: &str) -> String {
    Classifier::default().ensure_scheme(s)
}

fn first_segment(s: &str) -> &str {
    s.split('/').next().unwrap_or(s)
}

fn strip_query_and_fragment(s: &str) -> &str {
    let end = s.find(|c| c == '?' || c == '#').unwrap_or(s.len());
    &s[..end]
}

/// Lowercased host without userinfo or port
fn host_of(authority: &str) -> String {
    let without_user = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let without_port = without_user.split_once(':').map_or(without_user, |(h, _)| h);
    without_port.to_ascii_lowercase()
}
