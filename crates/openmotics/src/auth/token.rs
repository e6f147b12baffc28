//! Bearer token issued by the token endpoint.

use chrono::{DateTime, TimeDelta, Utc};
use http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Raw token endpoint payload.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// OAuth2 error payload (`{"error": "invalid_grant", ...}`).
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// An access token and its metadata.
///
/// Tokens are immutable; a refresh produces a new `Token` with a higher
/// `generation`.
#[derive(Debug)]
pub struct Token {
    access_token: SecretString,
    token_type: String,
    expires_at: Option<DateTime<Utc>>,
    refresh_token: Option<SecretString>,
    scope: Option<String>,
    generation: u64,
}

impl Token {
    pub(crate) fn from_response(response: TokenResponse, generation: u64) -> Self {
        let expires_at = response
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
        Self {
            access_token: SecretString::new(response.access_token.into_boxed_str()),
            token_type: response.token_type,
            expires_at,
            refresh_token: response
                .refresh_token
                .map(|t| SecretString::new(t.into_boxed_str())),
            scope: response.scope,
            generation,
        }
    }

    /// The access token.
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Token type reported by the server (normally `Bearer`).
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// When the token stops being valid; `None` when the server sent no
    /// lifetime or one too large to represent.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Refresh token, if one was issued.
    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    /// Granted scope.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Monotonic counter identifying which exchange produced this token.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if the token is expired or will expire within `leeway_seconds`.
    pub fn is_expired(&self, leeway_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => match TimeDelta::try_seconds(leeway_seconds) {
                Some(leeway) => expires_at.signed_duration_since(Utc::now()) <= leeway,
                None => true,
            },
            None => false,
        }
    }

    /// `Authorization` header value, marked sensitive.
    pub(crate) fn authorization(&self) -> Option<HeaderValue> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {}", self.access_token.expose_secret())).ok()?;
        value.set_sensitive(true);
        Some(value)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(access_token: &str, expires_in: Option<i64>, generation: u64) -> Self {
        Self::from_response(
            TokenResponse {
                access_token: access_token.to_string(),
                token_type: default_token_type(),
                expires_in,
                refresh_token: None,
                scope: None,
            },
            generation,
        )
    }
}
