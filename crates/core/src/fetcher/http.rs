//! HTTP page fetcher.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::CrawlerConfig;
use crate::metrics;

use super::decode::decode_body;
use super::rate_limiter::RequestLimiter;
use super::{FetchError, PageFetcher};

/// Fetches pages over HTTP with a browser-like identity.
pub struct HttpFetcher {
    client: Client,
    limiter: Option<RequestLimiter>,
}

impl HttpFetcher {
    /// Create a new fetcher from the crawler configuration.
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| FetchError::Internal(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            limiter: RequestLimiter::new(config.requests_per_minute),
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        let start = Instant::now();
        debug!(url = url, "Fetching page");

        let result = self.fetch_bytes(url).await;
        let label = match &result {
            Ok(_) => "success",
            Err(FetchError::Timeout) => "timeout",
            Err(FetchError::Status { .. }) => "status",
            Err(_) => "connection",
        };
        metrics::PAGES_FETCHED.with_label_values(&[label]).inc();
        metrics::FETCH_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(bytes) => {
                debug!(url = url, bytes = bytes.len(), "Page fetched");
                Ok(decode_body(&bytes))
            }
            Err(e) => {
                warn!(url = url, error = %e, "Page fetch failed");
                Err(e)
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::ConnectionFailed(e.to_string())
    }
}
