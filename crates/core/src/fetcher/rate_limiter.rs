//! Request throttling for polite crawling.
//!
//! A token bucket refilled at `requests_per_minute / 60` tokens per second.
//! The bucket starts full, so a short crawl never waits.

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

/// Token bucket sized to one minute of requests.
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    /// Tokens added per second.
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(requests_per_minute: u32) -> Self {
        let capacity = f64::from(requests_per_minute);
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    /// Take a token, or report how long until one is available.
    ///
    /// A bucket built with 0 requests per minute never limits.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        if self.refill_per_sec == 0.0 {
            return Ok(());
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }
        Err(Duration::from_secs_f64(
            (1.0 - self.tokens) / self.refill_per_sec,
        ))
    }

    /// Whole tokens currently available, without refilling.
    pub fn available(&self) -> u32 {
        self.tokens.floor() as u32
    }
}

/// Shared limiter that sleeps until a token is available.
pub(crate) struct RequestLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RequestLimiter {
    /// Returns `None` when `requests_per_minute` is 0 (unlimited).
    pub(crate) fn new(requests_per_minute: u32) -> Option<Self> {
        (requests_per_minute > 0).then(|| Self {
            bucket: Mutex::new(TokenBucket::new(requests_per_minute)),
        })
    }

    pub(crate) async fn acquire(&self) {
        loop {
            let wait = match self.bucket.lock().await.try_acquire() {
                Ok(()) => return,
                Err(wait) => wait,
            };
            debug!(wait_ms = wait.as_millis() as u64, "Rate limited, waiting");
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bucket_starts_full() {
        let mut bucket = TokenBucket::new(10);
        assert_eq!(bucket.available(), 10);

        for _ in 0..10 {
            assert!(bucket.try_acquire().is_ok());
        }
        assert_eq!(bucket.available(), 0);
        assert!(bucket.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_bucket_reports_wait() {
        let mut bucket = TokenBucket::new(10);
        for _ in 0..10 {
            bucket.try_acquire().unwrap();
        }

        // 10 rpm refills one token every 6 seconds
        let wait = bucket.try_acquire().unwrap_err();
        assert!(wait <= Duration::from_secs(6));
        assert!(wait > Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bucket_refills_over_time() {
        let mut bucket = TokenBucket::new(60);
        for _ in 0..60 {
            bucket.try_acquire().unwrap();
        }

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_ok());
        assert!(bucket.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_bucket_never_limits() {
        let mut bucket = TokenBucket::new(0);
        for _ in 0..100 {
            assert!(bucket.try_acquire().is_ok());
        }
    }

    #[test]
    fn test_request_limiter_disabled_at_zero() {
        assert!(RequestLimiter::new(0).is_none());
        assert!(RequestLimiter::new(30).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_limiter_waits_for_refill() {
        let limiter = RequestLimiter::new(60).unwrap();
        for _ in 0..60 {
            limiter.acquire().await;
        }

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(900));
    }
}
