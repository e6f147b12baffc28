#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions for the OpenMotics client.
//!
//! This crate holds the pieces of the request pipeline that do not depend on
//! HTTP or on the vendor API:
//!
//! - **Retry strategies** via the [`BackoffStrategy`](retry::BackoffStrategy) trait
//!   - Full-jitter exponential backoff
//!   - Attempt and wall-clock stop conditions
//!   - Cooperative cancellation
//! - **Error classification** via [`RetryableError`](retry::RetryableError),
//!   which lets any error type tell the policy whether it is transient
//!
//! # Examples
//!
//! ```rust
//! use openmotics_core::prelude::*;
//! use std::time::Duration;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("flaky")]
//! struct Flaky;
//!
//! impl RetryableError for Flaky {
//!     fn is_retryable(&self) -> bool {
//!         true
//!     }
//!
//!     fn cancelled() -> Self {
//!         Flaky
//!     }
//! }
//!
//! # async fn example() -> Result<(), Flaky> {
//! let backoff = ExponentialBackoff::builder()
//!     .max_attempts(3)
//!     .multiplier(Duration::from_millis(10))
//!     .build();
//!
//! let value = backoff.execute(|_attempt| async { Ok::<_, Flaky>(42) }).await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use openmotics_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::retry::{
        BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder, Jitter, RetryableError,
    };
}
