//! Common test utilities and helpers

use std::time::Duration;

use openmotics::{Client, ClientBuilder, RetryConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token endpoint path as seen by the mock server.
pub const TOKEN_PATH: &str = "/api/v1/authentication/oauth2/token";

/// Access token issued by [`token_response`].
pub const ACCESS_TOKEN: &str = "test-access-token";

/// Retry policy with millisecond waits.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        multiplier: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        ..Default::default()
    }
}

/// Builder pointed at the mock server with fast retries.
pub fn builder(server: &MockServer) -> ClientBuilder {
    Client::builder()
        .base_url(server.uri())
        .retry(fast_retry())
        .timeout(Duration::from_secs(5))
}

/// Cloud client using client credentials.
pub fn cloud_client(server: &MockServer) -> Client {
    builder(server)
        .client_credentials("test-client", "test-secret")
        .build()
        .expect("Failed to build client")
}

/// A successful token endpoint answer.
pub fn token_response(access_token: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "control view"
    }))
}

/// Mount a token endpoint that always issues [`ACCESS_TOKEN`].
#[allow(dead_code)]
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response(ACCESS_TOKEN, 3600))
        .mount(server)
        .await;
}

/// A `{"data": ...}` envelope.
#[allow(dead_code)]
pub fn data(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}
