//! Presign capability supplied by the host

use crate::error::PresignError;
use async_trait::async_trait;
use igv_uri::ObjectIdentifier;
use std::fmt::{self, Display, Formatter};
use std::future::Future;
use std::sync::Arc;

/// Time-limited fetchable URL for one object
///
/// Never cached: every load mints fresh URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedUrl(String);

impl ResolvedUrl {
    /// Wrap a URL
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Borrow the URL
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the URL
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for ResolvedUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResolvedUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Exchanges a canonical identifier for a fetchable URL
///
/// Assumed idempotent and free of side effects per call.
#[async_trait]
pub trait Presigner: Send + Sync {
    /// Presign one object
    ///
    /// # Errors
    /// Returns [`PresignError`] on access-denied, not-found or transport failure.
    async fn presign(&self, id: &ObjectIdentifier) -> Result<ResolvedUrl, PresignError>;
}

#[async_trait]
impl<T: Presigner + ?Sized> Presigner for Arc<T> {
    async fn presign(&self, id: &ObjectIdentifier) -> Result<ResolvedUrl, PresignError> {
        (**self).presign(id).await
    }
}

/// [`Presigner`] backed by an async closure
pub struct FnPresigner<F> {
    f: F,
}

impl<F> fmt::Debug for FnPresigner<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPresigner").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Presigner for FnPresigner<F>
where
    F: Fn(ObjectIdentifier) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, PresignError>> + Send,
{
    async fn presign(&self, id: &ObjectIdentifier) -> Result<ResolvedUrl, PresignError> {
        (self.f)(id.clone()).await.map(ResolvedUrl::from)
    }
}

/// Wrap an async closure as a [`Presigner`]
#[must_use]
pub fn presign_fn<F, Fut>(f: F) -> FnPresigner<F>
where
    F: Fn(ObjectIdentifier) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, PresignError>> + Send,
{
    FnPresigner { f }
}
