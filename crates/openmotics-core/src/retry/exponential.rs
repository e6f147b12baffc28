//! Exponential backoff with full jitter.

use super::strategy::{BackoffStrategy, RetryableError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How randomness is applied to the exponential delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Wait exactly the capped exponential delay.
    None,
    /// Draw the wait uniformly from `[0, capped exponential delay]`.
    #[default]
    Full,
}

/// Exponential backoff strategy with full jitter and two stop conditions.
///
/// # Formula
///
/// After attempt `n` (1-based) fails:
/// ```text
/// ceiling = min(multiplier * 2^(n-1), max_delay)
/// delay   = uniform(0, ceiling)        // Jitter::Full
/// ```
///
/// The sequence stops when `max_attempts` attempts have been made, or when
/// the next wait would end past `max_elapsed` measured from the first
/// attempt. The last error is returned as-is.
///
/// # Examples
///
/// ```rust
/// use openmotics_core::retry::ExponentialBackoff;
/// use std::time::Duration;
///
/// // 10 attempts, 300s budget, 1s multiplier, 30s cap
/// let backoff = ExponentialBackoff::default();
///
/// let custom = ExponentialBackoff::builder()
///     .max_attempts(3)
///     .multiplier(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(2))
///     .max_elapsed(Some(Duration::from_secs(10)))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    max_attempts: u32,
    multiplier: Duration,
    max_delay: Duration,
    max_elapsed: Option<Duration>,
    jitter: Jitter,
    cancel: Option<CancellationToken>,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Return a copy of this strategy that aborts when `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    /// Upper bound of the wait that follows failed attempt `attempt`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(62) as i32;
        let secs = self.multiplier.as_secs_f64() * 2f64.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    async fn run_attempt<Fut, T, E>(&self, attempt: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send,
        E: RetryableError,
    {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(E::cancelled()),
                outcome = attempt => outcome,
            },
            None => attempt.await,
        }
    }

    /// Sleep for `delay`; returns `false` if cancelled first.
    async fn wait(&self, delay: Duration) -> bool {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            },
            None => {
                tokio::time::sleep(delay).await;
                true
            }
        }
    }
}

impl Default for ExponentialBackoff {
    /// Defaults:
    /// - `max_attempts`: 10
    /// - `multiplier`: 1s
    /// - `max_delay`: 30s
    /// - `max_elapsed`: 300s
    /// - `jitter`: full
    fn default() -> Self {
        ExponentialBackoffBuilder::default().build()
    }
}

#[async_trait]
impl BackoffStrategy for ExponentialBackoff {
    async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn(u32) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: RetryableError,
    {
        let started = Instant::now();
        let mut attempt = 1;
        loop {
            if self.is_cancelled() {
                return Err(E::cancelled());
            }

            let err = match self.run_attempt(operation(attempt)).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !self.should_retry(&err, attempt) || attempt >= self.max_attempts {
                return Err(err);
            }
            let Some(delay) = self.next_delay(attempt) else {
                return Err(err);
            };
            if let Some(budget) = self.max_elapsed
                && started.elapsed() + delay >= budget
            {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Retry budget exhausted"
                );
                return Err(err);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying after transient failure"
            );

            if !self.wait(delay).await {
                return Err(E::cancelled());
            }
            attempt += 1;
        }
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        let ceiling = self.ceiling(attempt);
        Some(match self.jitter {
            Jitter::None => ceiling,
            Jitter::Full => ceiling.mul_f64(rand::random::<f64>()),
        })
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn max_elapsed(&self) -> Option<Duration> {
        self.max_elapsed
    }
}

/// Builder for configuring [`ExponentialBackoff`].
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    max_attempts: Option<u32>,
    multiplier: Option<Duration>,
    max_delay: Option<Duration>,
    max_elapsed: Option<Option<Duration>>,
    jitter: Option<Jitter>,
    cancel: Option<CancellationToken>,
}

impl ExponentialBackoffBuilder {
    /// Set the total number of attempts (first attempt included).
    ///
    /// Default: 10. Values below 1 are raised to 1.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Set the base of the exponential curve.
    ///
    /// Default: 1s
    pub fn multiplier(mut self, multiplier: Duration) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Set the cap applied to every individual wait.
    ///
    /// Default: 30s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the wall-clock budget, or `None` for no time limit.
    ///
    /// Default: 300s
    pub fn max_elapsed(mut self, budget: Option<Duration>) -> Self {
        self.max_elapsed = Some(budget);
        self
    }

    /// Set the jitter mode.
    ///
    /// Default: [`Jitter::Full`]
    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Abort waits and in-flight attempts when `token` is cancelled.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the [`ExponentialBackoff`], using defaults for unset values.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff {
            max_attempts: self.max_attempts.unwrap_or(10),
            multiplier: self.multiplier.unwrap_or(Duration::from_secs(1)),
            max_delay: self.max_delay.unwrap_or(Duration::from_secs(30)),
            max_elapsed: self.max_elapsed.unwrap_or(Some(Duration::from_secs(300))),
            jitter: self.jitter.unwrap_or_default(),
            cancel: self.cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, thiserror::Error, PartialEq)]
    enum TestError {
        #[error("transient {0}")]
        Transient(u32),
        #[error("fatal")]
        Fatal,
        #[error("cancelled")]
        Cancelled,
    }

    impl RetryableError for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient(_))
        }

        fn cancelled() -> Self {
            TestError::Cancelled
        }
    }

    #[test]
    fn test_ceiling_doubles_until_cap() {
        let backoff = ExponentialBackoff::default();

        assert_eq!(backoff.ceiling(1), Duration::from_secs(1));
        assert_eq!(backoff.ceiling(2), Duration::from_secs(2));
        assert_eq!(backoff.ceiling(3), Duration::from_secs(4));
        assert_eq!(backoff.ceiling(5), Duration::from_secs(16));
        assert_eq!(backoff.ceiling(6), Duration::from_secs(30));
        assert_eq!(backoff.ceiling(500), Duration::from_secs(30));
    }

    #[test]
    fn test_full_jitter_stays_within_ceiling() {
        let backoff = ExponentialBackoff::default();

        for attempt in 1..12 {
            for _ in 0..50 {
                let delay = backoff.next_delay(attempt).unwrap();
                assert!(
                    delay <= backoff.ceiling(attempt),
                    "Delay {:?} after attempt {} exceeded ceiling",
                    delay,
                    attempt
                );
            }
        }
    }

    #[test]
    fn test_no_jitter_is_deterministic() {
        let backoff = ExponentialBackoff::builder().jitter(Jitter::None).build();
        assert_eq!(backoff.next_delay(3), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_builder_defaults() {
        let backoff = ExponentialBackoff::builder().build();

        assert_eq!(backoff.max_attempts, 10);
        assert_eq!(backoff.multiplier, Duration::from_secs(1));
        assert_eq!(backoff.max_delay, Duration::from_secs(30));
        assert_eq!(backoff.max_elapsed, Some(Duration::from_secs(300)));
        assert_eq!(backoff.jitter, Jitter::Full);
    }

    #[test]
    fn test_max_attempts_floor() {
        let backoff = ExponentialBackoff::builder().max_attempts(0).build();
        assert_eq!(backoff.max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_retryable_stops_at_ten_attempts() {
        let backoff = ExponentialBackoff::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = backoff
            .execute(|attempt| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(TestError::Transient(attempt))
                }
            })
            .await;

        // Wait ceilings sum to 151s, inside the 300s budget.
        assert_eq!(attempts.load(Ordering::SeqCst), 10);
        assert!(started.elapsed() <= Duration::from_secs(151));
        // The last error comes back unchanged
        assert_eq!(result, Err(TestError::Transient(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_budget_stops_slow_attempts() {
        let backoff = ExponentialBackoff::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = backoff
            .execute(|_| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(50)).await;
                    Err::<(), _>(TestError::Transient(0))
                }
            })
            .await;

        assert!(result.is_err());
        assert!(attempts.load(Ordering::SeqCst) < 10);
        // One attempt may start just before the deadline and run to completion
        assert!(started.elapsed() < Duration::from_secs(300 + 50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_fails_immediately() {
        let backoff = ExponentialBackoff::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = backoff
            .execute(|_| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(TestError::Fatal)
                }
            })
            .await;

        tokio_test::assert_err!(&result);
        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_second_attempt() {
        let backoff = ExponentialBackoff::default();

        let result = backoff
            .execute(|attempt| async move {
                if attempt == 1 {
                    Err(TestError::Transient(attempt))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_wait() {
        let token = CancellationToken::new();
        let backoff = ExponentialBackoff::builder()
            .multiplier(Duration::from_secs(60))
            .max_delay(Duration::from_secs(60))
            .jitter(Jitter::None)
            .cancellation(token.clone())
            .build();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                token.cancel();
            })
        };

        let result = backoff
            .execute(|attempt| async move { Err::<(), _>(TestError::Transient(attempt)) })
            .await;

        canceller.await.unwrap();
        assert_eq!(result, Err(TestError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let backoff = ExponentialBackoff::default().with_cancellation(token);
        let attempts = Arc::new(AtomicU32::new(0));

        let result = backoff
            .execute(|_| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>(())
                }
            })
            .await;

        assert_eq!(result, Err(TestError::Cancelled));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The wait after any attempt never exceeds the 30s cap.
            #[test]
            fn prop_delay_never_exceeds_cap(attempt in 1u32..10_000) {
                let backoff = ExponentialBackoff::default();
                let delay = backoff.next_delay(attempt).unwrap();
                prop_assert!(delay <= Duration::from_secs(30));
            }
        }
    }
}
