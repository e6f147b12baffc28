//! HTTP request pipeline

mod classify;
mod executor;
mod rate_limit;
mod request;
mod response;
pub mod sanitize;

pub use classify::{TransportOutcome, classify};
pub use executor::{EndpointTarget, RequestExecutor};
pub use rate_limit::RateLimiter;
pub use request::RequestBuilder;
pub use response::{Body, Response};
pub use sanitize::{RequestSnapshot, ResponseSnapshot};

pub use http::{HeaderMap, Method, StatusCode};
