//! HTTP request builder

use super::{Response, executor::RequestExecutor};
use crate::error::{Error, Result};
use http::Method;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Builder for one API request.
///
/// Created by [`Client::request`](crate::Client::request); the path is
/// validated and resolved against the endpoint target at creation.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    executor: Arc<RequestExecutor>,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) url: Url,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
}

impl RequestBuilder {
    pub(crate) fn new(executor: Arc<RequestExecutor>, method: Method, path: &str) -> Result<Self> {
        let url = executor.target().url(path)?;
        Ok(Self {
            executor,
            method,
            path: path.to_string(),
            url,
            query: Vec::new(),
            body: None,
        })
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a query parameter when `value` is `Some`.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Append several query parameters.
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Argument(format!("request body is not serializable: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send the request through the retry pipeline.
    pub async fn send(self) -> Result<Response> {
        let executor = Arc::clone(&self.executor);
        executor.execute(&self).await
    }

    /// Get the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the path relative to the API prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the resolved URL (without query parameters).
    pub fn url(&self) -> &Url {
        &self.url
    }
}
