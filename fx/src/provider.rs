//! Feed sources.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{FeedError, FeedResult};

/// Default location of the full-history reference-rate feed.
pub const DEFAULT_FEED_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist.xml";

/// Trait for anything that can hand over the raw feed document.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Get the source name, used in logs.
    fn name(&self) -> &str;

    /// Fetch the raw feed bytes. One attempt, no retries.
    async fn fetch(&self) -> FeedResult<Vec<u8>>;
}

/// Fetches the feed with a single HTTP GET.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    /// Create a new HTTP source for the given URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("eurofx/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch(&self) -> FeedResult<Vec<u8>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Remote {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(url = %self.url, bytes = body.len(), "Downloaded feed");
        Ok(body.to_vec())
    }
}

#[cfg(any(test, feature = "test-utils"))]
enum Canned {
    Body(Vec<u8>),
    Status(u16),
    Unreachable,
}

/// Canned feed source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticFeedSource {
    canned: parking_lot::Mutex<Canned>,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticFeedSource {
    /// Serve the given document on every fetch.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self::with(Canned::Body(body.into()))
    }

    /// Answer every fetch with a non-success status.
    pub fn failing_with_status(status: u16) -> Self {
        Self::with(Canned::Status(status))
    }

    /// Fail every fetch with a transport error.
    pub fn unreachable() -> Self {
        Self::with(Canned::Unreachable)
    }

    /// Serve a different document from now on.
    pub fn set_body(&self, body: impl Into<Vec<u8>>) {
        *self.canned.lock() = Canned::Body(body.into());
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn with(canned: Canned) -> Self {
        Self {
            canned: parking_lot::Mutex::new(canned),
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl FeedSource for StaticFeedSource {
    fn name(&self) -> &str {
        "STATIC"
    }

    async fn fetch(&self) -> FeedResult<Vec<u8>> {
        self.fetches.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &*self.canned.lock() {
            Canned::Body(body) => Ok(body.clone()),
            Canned::Status(status) => Err(FeedError::Remote { status: *status }),
            Canned::Unreachable => Err(FeedError::Transport("connection refused".to_string())),
        }
    }
}
