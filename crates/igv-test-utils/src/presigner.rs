use async_trait::async_trait;
use igv_resolver::{PresignError, Presigner, ResolvedUrl};
use igv_uri::ObjectIdentifier;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Presigner returning `https://signed/<key>` unless scripted otherwise
#[derive(Debug)]
pub struct ScriptedPresigner {
    prefix: Option<String>,
    failures: Mutex<HashMap<String, PresignError>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for ScriptedPresigner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedPresigner {
    pub fn new() -> Self {
        Self::with_prefix("https://signed/")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::build(Some(prefix.into()))
    }

    /// Answers like a real object store: virtual-host URL with a signature
    /// query that changes on every call
    pub fn virtual_host() -> Self {
        Self::build(None)
    }

    fn build(prefix: Option<String>) -> Self {
        Self {
            prefix,
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Reject `identifier` (canonical `s3://bucket/key`)
    pub fn fail(&self, identifier: &str, error: PresignError) {
        self.failures.lock().insert(identifier.to_string(), error);
    }

    /// Delay the answer for `identifier`
    pub fn delay(&self, identifier: &str, delay: Duration) {
        self.delays.lock().insert(identifier.to_string(), delay);
    }

    /// Identifiers presigned so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of calls in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn signed_url(&self, id: &ObjectIdentifier, call: usize) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", id.key()),
            None => format!(
                "https://{}.s3.amazonaws.com/{}?X-Amz-Expires=3600&X-Amz-Signature=sig{call}",
                id.bucket(),
                id.key()
            ),
        }
    }
}

#[async_trait]
impl Presigner for ScriptedPresigner {
    async fn presign(&self, id: &ObjectIdentifier) -> Result<ResolvedUrl, PresignError> {
        let canonical = id.to_string();
        let call = {
            let mut calls = self.calls.lock();
            calls.push(canonical.clone());
            calls.len()
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.lock().get(&canonical).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self.failures.lock().get(&canonical).cloned();
        match failure {
            Some(err) => Err(err),
            None => Ok(ResolvedUrl::new(self.signed_url(id, call))),
        }
    }
}
