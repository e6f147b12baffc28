//! Client-side rate limiting

use crate::config::RateLimitConfig;
use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Token-bucket limiter applied before every attempt.
#[derive(Clone)]
pub struct RateLimiter {
    governor: Arc<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// Create a limiter from configuration.
    ///
    /// A zero rate is raised to 1 request per second; a zero burst falls back
    /// to the rate.
    pub fn new(config: &RateLimitConfig) -> Self {
        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(rate);
        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            governor: Arc::new(governor::RateLimiter::direct(quota)),
        }
    }

    /// Wait until a request may proceed.
    pub async fn until_ready(&self) {
        self.governor.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_burst_passes_without_waiting() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            requests_per_second: 1,
            burst_size: 3,
        });

        let started = Instant::now();
        for _ in 0..3 {
            limiter.until_ready().await;
        }
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_zero_rate_does_not_panic() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            requests_per_second: 0,
            burst_size: 0,
        });
        limiter.until_ready().await;
    }
}
