//! Retry strategy trait and the error classification it relies on.

use async_trait::async_trait;
use std::error::Error;
use std::future::Future;
use std::time::Duration;

/// An error that knows whether repeating the failed operation can help.
///
/// The retry loop never inspects error messages or variants itself; it asks
/// the error. Types that implement this trait also provide the value reported
/// when a retry sequence is cancelled from outside.
pub trait RetryableError: Error + Send + Sync + 'static {
    /// `true` if the failure is transient and the operation may be re-attempted.
    fn is_retryable(&self) -> bool;

    /// The error returned when a retry sequence is cancelled mid-wait or
    /// mid-attempt.
    fn cancelled() -> Self
    where
        Self: Sized;
}

/// A strategy for retrying failed operations with backoff.
///
/// Implementations decide when to retry, how long to wait between attempts,
/// and when to give up.
///
/// # Examples
///
/// ```rust
/// use openmotics_core::retry::{BackoffStrategy, ExponentialBackoff, RetryableError};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("transient")]
/// struct Transient;
///
/// impl RetryableError for Transient {
///     fn is_retryable(&self) -> bool { true }
///     fn cancelled() -> Self { Transient }
/// }
///
/// # async fn example() -> Result<(), Transient> {
/// let backoff = ExponentialBackoff::builder()
///     .max_attempts(5)
///     .multiplier(Duration::from_millis(1))
///     .build();
///
/// let calls = Arc::new(AtomicU32::new(0));
/// let value = backoff
///     .execute(|_attempt| {
///         let calls = Arc::clone(&calls);
///         async move {
///             if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///                 Err(Transient)
///             } else {
///                 Ok(7)
///             }
///         }
///     })
///     .await?;
/// assert_eq!(value, 7);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BackoffStrategy: Send + Sync {
    /// Execute an operation with retry logic.
    ///
    /// The operation receives the 1-based attempt number and is called until
    /// it succeeds, fails with a non-retryable error, or a stop condition is
    /// reached. The last error is returned unchanged.
    async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn(u32) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: RetryableError;

    /// Determine if a failed attempt should be followed by another.
    ///
    /// The default defers to the error's own classification.
    fn should_retry(&self, error: &dyn RetryableError, attempt: u32) -> bool {
        let _ = attempt;
        error.is_retryable()
    }

    /// Delay to wait after the given attempt (1-based) failed.
    ///
    /// `None` means no further attempts should be made.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Total number of attempts, including the first one.
    fn max_attempts(&self) -> u32;

    /// Wall-clock budget measured from the start of the first attempt.
    fn max_elapsed(&self) -> Option<Duration> {
        None
    }
}
