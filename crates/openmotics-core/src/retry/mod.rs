//! Retry strategies and backoff implementations.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Core trait for retry strategies
//! - [`ExponentialBackoff`] - Full-jitter exponential backoff with attempt and
//!   elapsed-time ceilings
//! - [`RetryableError`] - Classification hook implemented by error types

mod exponential;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder, Jitter};
pub use strategy::{BackoffStrategy, RetryableError};
