//! Minimum-interval throttle for the live endpoint

use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Enforces a minimum spacing between consecutive requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum time between two requests
    min_interval: Duration,
    /// When the last request was issued
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Get time until next request is allowed
    #[must_use]
    pub fn time_until_next_request(&self) -> Duration {
        match self.last_request {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleep until a request is allowed, then record it as issued.
    pub async fn acquire(&mut self) {
        let wait_time = self.time_until_next_request();
        if !wait_time.is_zero() {
            debug!(
                "Rate limit: waiting {:.3}s before next request",
                wait_time.as_secs_f64()
            );
            sleep(wait_time).await;
        }
        self.last_request = Some(Instant::now());
    }
}
