//! HTTP response types

use crate::error::{ApiContext, Error, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Decoded response body.
///
/// Bodies served as `application/json` are decoded eagerly; anything else is
/// kept as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON payload
    Json(serde_json::Value),
    /// Non-JSON payload
    Text(String),
}

impl Body {
    /// Deserialize the whole JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Body::Json(value) => T::deserialize(value).map_err(|e| {
                Error::invalid_response(&e.to_string(), ApiContext::default())
            }),
            Body::Text(_) => Err(Error::invalid_response(
                "expected a JSON body, got text",
                ApiContext::default(),
            )),
        }
    }

    /// Unwrap the `{"data": ...}` success envelope and deserialize its content.
    ///
    /// ```rust
    /// use openmotics::http::Body;
    /// use serde_json::json;
    ///
    /// let body = Body::Json(json!({"data": [{"id": 1}, {"id": 2}]}));
    /// let ids: Vec<serde_json::Value> = body.data().unwrap();
    /// assert_eq!(ids.len(), 2);
    /// ```
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        let Body::Json(value) = self else {
            return Err(Error::invalid_response(
                "expected a JSON body, got text",
                ApiContext::default(),
            ));
        };
        let data = value.get("data").ok_or_else(|| {
            Error::invalid_response(
                "response is missing the `data` envelope",
                ApiContext::default(),
            )
        })?;
        T::deserialize(data)
            .map_err(|e| Error::invalid_response(&e.to_string(), ApiContext::default()))
    }

    /// The JSON value, if this is a JSON body.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// The text, if this is a non-JSON body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Json(_) => None,
            Body::Text(text) => Some(text),
        }
    }
}

/// Successful response together with its HTTP metadata.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
    attempts: u32,
    elapsed: Duration,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Body) -> Self {
        Self {
            status,
            headers,
            body,
            attempts: 1,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn with_stats(mut self, attempts: u32, elapsed: Duration) -> Self {
        self.attempts = attempts;
        self.elapsed = elapsed;
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the decoded body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consume the response, keeping the body.
    pub fn into_body(self) -> Body {
        self.body
    }

    /// Number of attempts the retry policy made, including the successful one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wall-clock time across all attempts and waits.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Decode a body according to its `Content-Type`.
pub(crate) fn decode_body(
    content_type: Option<&str>,
    bytes: &[u8],
) -> std::result::Result<Body, String> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        if bytes.is_empty() {
            return Ok(Body::Json(serde_json::Value::Null));
        }
        serde_json::from_slice(bytes)
            .map(Body::Json)
            .map_err(|e| format!("invalid JSON body: {e}"))
    } else {
        Ok(Body::Text(String::from_utf8_lossy(bytes).into_owned()))
    }
}
