//! Mock page fetcher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, PageFetcher};

/// Mock implementation of the PageFetcher trait.
///
/// Serves canned HTML by exact URL. Unknown URLs answer 404, and URLs
/// marked as failing return a connection error. Every request is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use brindes_core::testing::{MockFetcher, fixtures};
///
/// let fetcher = MockFetcher::new();
/// fetcher
///     .set_page(
///         "https://www.signa.pt/brindes/categoria.asp?idCategoria=34",
///         fixtures::listing_page(100, 3),
///     )
///     .await;
///
/// let html = fetcher.fetch("https://www.signa.pt/brindes/categoria.asp?idCategoria=34").await?;
/// assert_eq!(fetcher.requested_urls().await.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    /// Canned pages by URL.
    pages: Arc<RwLock<HashMap<String, String>>>,
    /// URLs that fail with a connection error.
    failing: Arc<RwLock<HashSet<String>>>,
    /// Page served for any URL without a canned page.
    fallback: Arc<RwLock<Option<String>>>,
    /// URLs requested, in order.
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a fetcher with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub async fn set_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.write().await.insert(url.into(), html.into());
    }

    /// Serve `html` for every URL that has no page of its own.
    pub async fn set_fallback(&self, html: impl Into<String>) {
        *self.fallback.write().await = Some(html.into());
    }

    /// Make requests for `url` fail.
    pub async fn fail_url(&self, url: impl Into<String>) {
        self.failing.write().await.insert(url.into());
    }

    /// URLs requested so far, in order.
    pub async fn requested_urls(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Number of requests made.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.write().await.push(url.to_string());

        if self.failing.read().await.contains(url) {
            return Err(FetchError::ConnectionFailed(format!(
                "mock failure for {}",
                url
            )));
        }

        if let Some(html) = self.pages.read().await.get(url) {
            return Ok(html.clone());
        }

        match self.fallback.read().await.as_ref() {
            Some(html) => Ok(html.clone()),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_pages_and_records_requests() {
        let fetcher = MockFetcher::new();
        fetcher.set_page("http://a", "<html>a</html>").await;

        assert_eq!(fetcher.fetch("http://a").await.unwrap(), "<html>a</html>");
        assert!(matches!(
            fetcher.fetch("http://b").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.requested_urls().await, vec!["http://a", "http://b"]);
    }

    #[tokio::test]
    async fn test_failing_url() {
        let fetcher = MockFetcher::new();
        fetcher.set_page("http://a", "ok").await;
        fetcher.fail_url("http://a").await;

        assert!(matches!(
            fetcher.fetch("http://a").await,
            Err(FetchError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_fallback_page() {
        let fetcher = MockFetcher::new();
        fetcher.set_fallback("any").await;
        assert_eq!(fetcher.fetch("http://whatever").await.unwrap(), "any");
        assert_eq!(fetcher.request_count().await, 1);
    }
}
