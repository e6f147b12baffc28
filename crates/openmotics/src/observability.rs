//! Structured logging for the request pipeline
//!
//! All API requests and their outcomes are logged through this layer so the
//! field names stay consistent: `method`, `path`, `attempt`, `status`,
//! `elapsed_ms`. Paths are logged relative to the API prefix and never carry
//! credentials; query strings are left out.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::Error;

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST)
    pub method: String,
    /// Request path relative to the API prefix
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log one attempt being sent
    pub fn log_attempt(&self, attempt: u32) {
        debug!(
            method = %self.method,
            path = %self.path,
            attempt,
            body_size = self.body_size,
            "Sending HTTP request"
        );
    }

    /// Log a failed attempt
    pub fn log_attempt_failed(&self, attempt: u32, error: &Error, elapsed: Duration) {
        let status = error.status();
        if error.is_retryable() {
            warn!(
                method = %self.method,
                path = %self.path,
                attempt,
                status,
                kind = ?error.kind(),
                elapsed_ms = elapsed.as_millis() as u64,
                "HTTP attempt failed with a retryable error"
            );
        } else {
            debug!(
                method = %self.method,
                path = %self.path,
                attempt,
                status,
                kind = ?error.kind(),
                elapsed_ms = elapsed.as_millis() as u64,
                "HTTP attempt failed"
            );
        }
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code, when the server answered
    pub status: Option<u16>,
    /// Time elapsed across all attempts
    pub elapsed: Duration,
    /// Number of attempts made
    pub attempts: u32,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: Option<u16>, elapsed: Duration) -> Self {
        Self {
            status,
            elapsed,
            attempts: 1,
        }
    }

    /// Set the number of attempts
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            attempts = self.attempts,
            "HTTP request succeeded"
        );
    }

    /// Log a request that failed for good
    pub fn log_error(&self, request: &RequestMetadata, error: &Error) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            error = %error,
            attempts = self.attempts,
            "HTTP request failed"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
