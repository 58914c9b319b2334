//! Presigner that maps identifiers onto a URL template
//!
//! Produces plain endpoint URLs without a signature. Useful against public
//! buckets and for checking which fields a configuration would resolve.

use async_trait::async_trait;
use igv_resolver::{PresignError, Presigner, ResolvedUrl};
use igv_uri::ObjectIdentifier;

/// Virtual-host template used when none is given
pub const DEFAULT_TEMPLATE: &str = "https://{bucket}.s3.amazonaws.com/{key}";

#[derive(Debug, Clone)]
pub struct EndpointPresigner {
    template: String,
}

impl EndpointPresigner {
    /// Create from a template containing `{key}` and optionally `{bucket}`
    pub fn new(template: impl Into<String>) -> anyhow::Result<Self> {
        let template = template.into();
        anyhow::ensure!(
            template.contains("{key}"),
            "template '{template}' has no {{key}} placeholder"
        );
        Ok(Self { template })
    }

    pub fn render(&self, id: &ObjectIdentifier) -> String {
        self.template
            .replace("{bucket}", id.bucket())
            .replace("{key}", id.key())
    }
}

impl Default for EndpointPresigner {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[async_trait]
impl Presigner for EndpointPresigner {
    async fn presign(&self, id: &ObjectIdentifier) -> Result<ResolvedUrl, PresignError> {
        let url = self.render(id);
        tracing::debug!(%id, %url, "Rendered endpoint URL");
        Ok(ResolvedUrl::new(url))
    }
}
