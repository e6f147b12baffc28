//! # OpenMotics Client
//!
//! Async Rust client for the OpenMotics building-automation REST API,
//! covering both the cloud service and local gateways:
//! - OAuth2 client-credentials (cloud) and password (gateway) grants
//! - Transparent token refresh shared by concurrent requests
//! - Bounded full-jitter exponential retry on transient failures
//! - A closed error taxonomy with sanitized request/response snapshots
//! - Typed facades for installations, outputs, lights, sensors, shutters,
//!   group actions and thermostats
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use openmotics::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::cloud("client-id", "client-secret")?;
//!
//!     for installation in client.installations().list(None).await? {
//!         println!("{:?} {:?}", installation.id, installation.name);
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Retries and side effects
//!
//! Network timeouts, unreachable hosts, 5xx answers and unclassified
//! statuses are retried, POSTs included. A POST whose response was lost
//! may therefore be applied twice by the server, for example triggering a
//! group action a second time. A client built with
//! [`RetryConfig::disabled`] makes exactly one attempt per call.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use auth::{AuthState, Credentials};
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, ConnectionPoolConfig, RateLimitConfig, RetryConfig};
pub use error::{ApiContext, Error, ErrorKind, Result};
pub use http::{Body, Response};
pub use types::*;

// Module declarations
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod resources;
pub mod types;

pub use openmotics_core::retry::Jitter;
pub use serde_json::Value as JsonValue;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use openmotics::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Body, Client, ClientConfig, Credentials, Error, ErrorKind, Result,
        types::{
            GroupAction, Installation, Light, Output, Sensor, Shutter, ThermostatGroup,
            ThermostatUnit,
        },
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host of the OpenMotics cloud API
pub const CLOUD_HOST: &str = "cloud.openmotics.com";

/// Path prefix of every API endpoint
pub const API_PREFIX: &str = "/api/v1";

/// OAuth2 token endpoint, relative to [`API_PREFIX`]
pub const TOKEN_PATH: &str = "/authentication/oauth2/token";
