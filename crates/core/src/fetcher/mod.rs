//! Page fetching abstraction.
//!
//! This module provides a `PageFetcher` trait for retrieving raw listing HTML,
//! an HTTP implementation, and the byte decoding chain used for legacy pages.

mod decode;
mod http;
mod rate_limiter;

pub use decode::decode_body;
pub use http::HttpFetcher;
pub use rate_limiter::TokenBucket;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for page sources (live HTTP, fixtures).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetcher name for logging.
    fn name(&self) -> &str;

    /// Fetch the page at `url` and return it as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
