//! Credential redaction for request/response snapshots.
//!
//! Snapshots end up in error values and log lines, so every string that may
//! carry a password, client secret or token passes through here first.

use http::HeaderMap;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Marker substituted for redacted values.
pub const FILTERED: &str = "<FILTERED>";

/// Response bodies longer than this many characters are truncated.
pub const MAX_BODY_CHARS: usize = 2048;

static FORM_SECRET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Za-z0-9_.-]*(?:password|access_token|client_secret|refresh_token))=[^&\s#]*",
    )
    .expect("FORM_SECRET should compile - this is a bug")
});

static JSON_SECRET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""([A-Za-z0-9_.-]*(?:password|access_token|client_secret|refresh_token))"\s*:\s*"(?:[^"\\]|\\.)*""#,
    )
    .expect("JSON_SECRET should compile - this is a bug")
});

const SENSITIVE_HEADERS: &[&str] = &["authorization", "proxy-authorization", "cookie"];

/// Redact credential values in a URL, form body or JSON body.
pub fn redact(input: &str) -> String {
    let form = FORM_SECRET.replace_all(input, format!("${{1}}={FILTERED}").as_str());
    JSON_SECRET
        .replace_all(&form, format!(r#""${{1}}":"{FILTERED}""#).as_str())
        .into_owned()
}

/// Redact and cap a body at [`MAX_BODY_CHARS`] characters.
pub fn redact_truncated(body: &str) -> String {
    let redacted = redact(body);
    match redacted.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}...[truncated]", &redacted[..cut]),
        None => redacted,
    }
}

/// Sanitized view of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    /// HTTP method
    pub method: String,
    /// Full URL, credentials in the query redacted
    pub url: String,
    /// Header pairs, sensitive values replaced with [`FILTERED`]
    pub headers: Vec<(String, String)>,
    /// Body, credentials redacted
    pub body: Option<String>,
}

impl RequestSnapshot {
    /// Snapshot of a request without headers or body.
    pub fn new(method: impl Into<String>, url: impl AsRef<str>) -> Self {
        Self {
            method: method.into(),
            url: redact(url.as_ref()),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Record the request headers.
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        self.headers = headers
            .iter()
            .map(|(name, value)| {
                let value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                    FILTERED.to_string()
                } else {
                    redact(&String::from_utf8_lossy(value.as_bytes()))
                };
                (name.as_str().to_string(), value)
            })
            .collect();
        self
    }

    /// Record the request body.
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(redact(body));
        self
    }
}

/// Sanitized view of a received response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSnapshot {
    /// HTTP status code
    pub status: u16,
    /// Final URL, credentials redacted
    pub url: String,
    /// Body, credentials redacted and truncated
    pub body: String,
    /// Time from sending the request to reading the body
    pub duration: Duration,
}

impl ResponseSnapshot {
    /// Snapshot a response.
    pub fn new(status: u16, url: impl AsRef<str>, body: &str, duration: Duration) -> Self {
        Self {
            status,
            url: redact(url.as_ref()),
            body: redact_truncated(body),
            duration,
        }
    }
}
