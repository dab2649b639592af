//! Backend trait and resolver chain
//!
//! The fallback order is a first-class data structure: an ordered list
//! of backends, tried sequentially, short-circuiting on the first
//! success. Every backend failure is caught here and converted into a
//! decline; only exhaustion of the whole chain surfaces as an error.

use crate::error::{Error, Result};
use crate::models::AudioLocator;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default upper bound on a single backend attempt
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// One concrete method for turning a source URL into playable audio
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Short backend name for logs and diagnostics
    fn name(&self) -> &'static str;

    /// Attempts to resolve an audio locator for the given URL
    ///
    /// Any error returned here is treated as "this backend declined";
    /// the chain advances to the next candidate.
    async fn resolve(&self, url: &str) -> Result<AudioLocator>;
}

/// Ordered fallback sequence of backends
///
/// Attempts run sequentially, never concurrently: racing backends would
/// double-bill the credentialed scraping API for no benefit. Each
/// attempt is bounded by `attempt_timeout` so a stalled upstream cannot
/// hold a request indefinitely.
pub struct ResolverChain {
    backends: Vec<Arc<dyn AudioBackend>>,
    attempt_timeout: Duration,
}

impl ResolverChain {
    /// Creates a chain from an ordered list of backends (highest
    /// priority first)
    pub fn new(backends: Vec<Arc<dyn AudioBackend>>) -> Self {
        Self {
            backends,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Overrides the per-attempt timeout
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Backend names in attempt order
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Resolves an audio locator by walking the chain
    ///
    /// Returns the first successful locator, or
    /// `Error::AllBackendsFailed` carrying the last backend's
    /// diagnostic once every candidate has declined.
    pub async fn resolve(&self, url: &str) -> Result<AudioLocator> {
        let mut last_decline: Option<(&'static str, String)> = None;

        for backend in &self.backends {
            debug!(backend = backend.name(), url, "Trying backend");

            match tokio::time::timeout(self.attempt_timeout, backend.resolve(url)).await {
                Ok(Ok(locator)) => {
                    info!(backend = backend.name(), "Backend resolved audio locator");
                    return Ok(locator);
                }
                Ok(Err(err)) => {
                    warn!(backend = backend.name(), error = %err, "Backend declined");
                    last_decline = Some((backend.name(), err.to_string()));
                }
                Err(_) => {
                    let err = Error::BackendTimeout(self.attempt_timeout.as_secs());
                    warn!(backend = backend.name(), error = %err, "Backend declined");
                    last_decline = Some((backend.name(), err.to_string()));
                }
            }
        }

        let (backend, message) =
            last_decline.unwrap_or(("none", "no backends configured".to_string()));
        Err(Error::AllBackendsFailed { backend, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AudioLocator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that always succeeds with a remote-URL locator
    struct OkBackend {
        name: &'static str,
        url: &'static str,
        calls: AtomicUsize,
    }

    impl OkBackend {
        fn new(name: &'static str, url: &'static str) -> Self {
            Self {
                name,
                url,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AudioBackend for OkBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn resolve(&self, _url: &str) -> Result<AudioLocator> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AudioLocator::remote_url(self.url))
        }
    }

    /// Backend that always declines
    struct FailBackend {
        name: &'static str,
        message: &'static str,
        calls: AtomicUsize,
    }

    impl FailBackend {
        fn new(name: &'static str, message: &'static str) -> Self {
            Self {
                name,
                message,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AudioBackend for FailBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn resolve(&self, _url: &str) -> Result<AudioLocator> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::extraction(self.message))
        }
    }

    /// Backend that hangs forever
    struct StallBackend;

    #[async_trait]
    impl AudioBackend for StallBackend {
        fn name(&self) -> &'static str {
            "stall"
        }

        async fn resolve(&self, _url: &str) -> Result<AudioLocator> {
            futures::future::pending::<Result<AudioLocator>>().await
        }
    }

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[tokio::test]
    async fn first_success_short_circuits() {
        let first = Arc::new(OkBackend::new("first", "https://cdn.example.com/1"));
        let second = Arc::new(OkBackend::new("second", "https://cdn.example.com/2"));
        let chain = ResolverChain::new(vec![first.clone(), second.clone()]);

        let locator = chain.resolve(URL).await.unwrap();

        match locator.source {
            crate::models::AudioSource::RemoteUrl(u) => {
                assert_eq!(u, "https://cdn.example.com/1")
            }
            other => panic!("unexpected source: {other:?}"),
        }
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn decline_advances_to_next_backend() {
        let failing = Arc::new(FailBackend::new("scraper", "upstream exploded"));
        let ok = Arc::new(OkBackend::new("ytdl", "https://cdn.example.com/ok"));
        let chain = ResolverChain::new(vec![failing.clone(), ok.clone()]);

        let locator = chain.resolve(URL).await.unwrap();

        match locator.source {
            crate::models::AudioSource::RemoteUrl(u) => {
                assert_eq!(u, "https://cdn.example.com/ok")
            }
            other => panic!("unexpected source: {other:?}"),
        }
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ok.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_reports_last_backend_diagnostic() {
        let a = Arc::new(FailBackend::new("a", "first failure"));
        let b = Arc::new(FailBackend::new("b", "second failure"));
        let chain = ResolverChain::new(vec![a as _, b as _]);

        let err = chain.resolve(URL).await.unwrap_err();

        match err {
            Error::AllBackendsFailed { backend, message } => {
                assert_eq!(backend, "b");
                assert!(message.contains("second failure"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn each_backend_is_tried_at_most_once() {
        let a = Arc::new(FailBackend::new("a", "boom"));
        let b = Arc::new(FailBackend::new("b", "boom"));
        let chain = ResolverChain::new(vec![a.clone() as _, b.clone() as _]);

        let _ = chain.resolve(URL).await;

        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stalled_backend_counts_as_decline() {
        let ok = Arc::new(OkBackend::new("fallback", "https://cdn.example.com/late"));
        let chain = ResolverChain::new(vec![Arc::new(StallBackend) as _, ok.clone() as _])
            .with_attempt_timeout(Duration::from_millis(50));

        let locator = chain.resolve(URL).await.unwrap();

        assert!(matches!(
            locator.source,
            crate::models::AudioSource::RemoteUrl(_)
        ));
        assert_eq!(ok.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_chain_fails_cleanly() {
        let chain = ResolverChain::new(vec![]);
        let err = chain.resolve(URL).await.unwrap_err();
        assert!(matches!(err, Error::AllBackendsFailed { backend: "none", .. }));
    }
}
