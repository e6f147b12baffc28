//! Request execution with authentication, classification and retry
//!
//! One [`RequestExecutor`] is shared by every clone of a
//! [`Client`](crate::Client). Each request runs as a strictly sequential
//! retry sequence:
//!
//! 1. wait for the rate limiter (if enabled)
//! 2. take a token snapshot from the [`TokenManager`]
//! 3. send with a fixed per-attempt timeout
//! 4. classify the outcome; the backoff policy decides whether to go again
//!
//! A 401/403 answer triggers one re-authentication followed by one re-send
//! within the same attempt.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use openmotics_core::retry::{BackoffStrategy, ExponentialBackoff};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::classify::{TransportOutcome, classify};
use super::rate_limit::RateLimiter;
use super::request::RequestBuilder;
use super::response::{Response, decode_body};
use super::sanitize::{RequestSnapshot, ResponseSnapshot, redact};
use crate::auth::{Token, TokenManager};
use crate::config::ClientConfig;
use crate::error::{ApiContext, Error, ErrorKind, Result};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};

/// Where requests go: `base_url + path_prefix + path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTarget {
    base_url: Url,
    path_prefix: String,
}

impl EndpointTarget {
    /// Resolve the target from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for an empty or unparsable base URL or a
    /// scheme other than `http`/`https`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let base = match &config.base_url {
            Some(base_url) => base_url.trim().to_string(),
            None => {
                let scheme = if config.ssl { "https" } else { "http" };
                let host = config.host.as_deref().unwrap_or(crate::CLOUD_HOST).trim();
                if host.is_empty() {
                    return Err(Error::Argument("host cannot be empty".to_string()));
                }
                format!("{scheme}://{host}:{}", config.port)
            }
        };
        if base.is_empty() {
            return Err(Error::Argument("base URL cannot be empty".to_string()));
        }

        let base_url: Url = base
            .parse()
            .map_err(|e| Error::Argument(format!("invalid base URL {base:?}: {e}")))?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::Argument(format!(
                    "invalid URL scheme '{scheme}'. Only 'http' and 'https' are supported."
                )));
            }
        }

        let prefix = config.path_prefix.trim().trim_end_matches('/');
        let path_prefix = if prefix.is_empty() || prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{prefix}")
        };

        Ok(Self {
            base_url,
            path_prefix,
        })
    }

    /// Base URL (scheme, host, port).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Prefix inserted between the base URL and every path.
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Full URL for a relative API path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if `path` carries a scheme or does not
    /// start with a single `/`.
    pub fn url(&self, path: &str) -> Result<Url> {
        if path.contains("://") {
            return Err(Error::Argument(format!(
                "path {path:?} must be relative to the API, not an absolute URL"
            )));
        }
        if !path.starts_with('/') || path.starts_with("//") {
            return Err(Error::Argument(format!(
                "path {path:?} must start with a single '/'"
            )));
        }

        let joined = format!(
            "{}{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.path_prefix,
            path
        );
        Url::parse(&joined).map_err(|e| Error::Argument(format!("invalid path {path:?}: {e}")))
    }
}

/// Shared request pipeline behind [`Client`](crate::Client).
pub struct RequestExecutor {
    http: reqwest::Client,
    target: EndpointTarget,
    tokens: Arc<TokenManager>,
    backoff: ExponentialBackoff,
    timeout: Duration,
    limiter: Option<RateLimiter>,
    shutdown: CancellationToken,
}

impl RequestExecutor {
    /// Build the pipeline: HTTP client, endpoint target, token manager and
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if credentials are missing, the target is
    /// invalid or the HTTP client cannot be constructed.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let credentials = config.credentials.clone().ok_or_else(|| {
            Error::Argument(
                "no credentials configured; provide a client id and secret (cloud) or a \
                 username and password (local gateway)"
                    .to_string(),
            )
        })?;
        let target = EndpointTarget::from_config(config)?;

        let pool = &config.connection_pool;
        let mut builder = reqwest::Client::builder()
            .user_agent(
                config
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| format!("openmotics-rust/{}", crate::VERSION)),
            )
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_keepalive(pool.tcp_keepalive)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Argument(format!("failed to build HTTP client: {e}")))?;

        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            target.url(crate::TOKEN_PATH)?,
            credentials,
            config.token_leeway,
            config.timeout,
        ));

        let shutdown = CancellationToken::new();
        Ok(Self {
            http,
            target,
            tokens,
            backoff: config.retry.backoff().with_cancellation(shutdown.clone()),
            timeout: config.timeout,
            limiter: config.rate_limit.as_ref().map(RateLimiter::new),
            shutdown,
        })
    }

    /// The endpoint target.
    pub fn target(&self) -> &EndpointTarget {
        &self.target
    }

    /// The token manager.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancel in-flight retry sequences, drop the token and refuse further
    /// requests. Idempotent.
    pub async fn close(&self) {
        self.cancel();
        self.tokens.close().await;
    }

    /// Synchronous half of [`close`](Self::close): cancel retries and refuse
    /// new requests and token exchanges.
    pub(crate) fn cancel(&self) {
        self.shutdown.cancel();
        self.tokens.mark_closed();
    }

    pub(crate) async fn execute(&self, request: &RequestBuilder) -> Result<Response> {
        if self.is_closed() {
            return Err(Error::Closed);
        }

        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| Error::Argument(format!("request body is not serializable: {e}")))?;

        let mut metadata = RequestMetadata::new(request.method.as_str(), request.path.as_str());
        if let Some(body) = &body {
            metadata = metadata.with_body_size(body.len());
        }

        let timer = RequestTimer::start();
        let last_attempt = AtomicU32::new(0);
        let reauthenticated = AtomicBool::new(false);

        let result = {
            let (body, metadata) = (body.as_deref(), &metadata);
            let (last_attempt, reauthenticated) = (&last_attempt, &reauthenticated);
            self.backoff
                .execute(move |attempt| {
                    last_attempt.store(attempt, Ordering::SeqCst);
                    self.attempt(request, body, attempt, metadata, reauthenticated)
                })
                .await
        };

        let attempts = last_attempt.load(Ordering::SeqCst).max(1);
        match result {
            Ok(response) => {
                ResponseMetadata::new(Some(response.status().as_u16()), timer.elapsed())
                    .with_attempts(attempts)
                    .log_success(&metadata);
                Ok(response.with_stats(attempts, timer.elapsed()))
            }
            Err(error) => {
                ResponseMetadata::new(error.status(), timer.elapsed())
                    .with_attempts(attempts)
                    .log_error(&metadata, &error);
                Err(error)
            }
        }
    }

    async fn attempt(
        &self,
        request: &RequestBuilder,
        body: Option<&[u8]>,
        attempt: u32,
        metadata: &RequestMetadata,
        reauthenticated: &AtomicBool,
    ) -> Result<Response> {
        let token = self.tokens.token().await?;
        match self.send(request, body, &token, attempt, metadata).await {
            Err(error)
                if error.kind() == ErrorKind::Unauthorized
                    && !reauthenticated.swap(true, Ordering::SeqCst) =>
            {
                debug!(
                    generation = token.generation(),
                    path = %request.path,
                    "Token rejected, re-authenticating once"
                );
                self.tokens.invalidate(token.generation()).await;
                let token = self.tokens.token().await?;
                self.send(request, body, &token, attempt, metadata).await
            }
            other => other,
        }
    }

    async fn send(
        &self,
        request: &RequestBuilder,
        body: Option<&[u8]>,
        token: &Token,
        attempt: u32,
        metadata: &RequestMetadata,
    ) -> Result<Response> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let authorization = token.authorization().ok_or_else(|| {
            Error::invalid_response(
                "access token contains characters that are not valid in a header",
                ApiContext::default(),
            )
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut url = request.url.clone();
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let mut snapshot =
            RequestSnapshot::new(request.method.as_str(), url.as_str()).with_headers(&headers);
        if let Some(body) = body {
            snapshot = snapshot.with_body(&String::from_utf8_lossy(body));
        }

        metadata.log_attempt(attempt);
        let timer = RequestTimer::start();

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers)
            .timeout(self.timeout);
        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = transport_failure(&e, snapshot);
                metadata.log_attempt_failed(attempt, &error, timer.elapsed());
                return Err(error);
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let error = transport_failure(&e, snapshot);
                metadata.log_attempt_failed(attempt, &error, timer.elapsed());
                return Err(error);
            }
        };

        let context = || {
            ApiContext::new(snapshot.clone()).with_response(ResponseSnapshot::new(
                status.as_u16(),
                &final_url,
                &String::from_utf8_lossy(&bytes),
                timer.elapsed(),
            ))
        };

        if let Some(error) = classify(&TransportOutcome::Status(status.as_u16()), &context) {
            metadata.log_attempt_failed(attempt, &error, timer.elapsed());
            return Err(error);
        }

        let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let decoded = decode_body(content_type, &bytes)
            .map_err(|detail| Error::invalid_response(&detail, context()))?;
        Ok(Response::new(status, headers, decoded))
    }
}

fn transport_failure(error: &reqwest::Error, snapshot: RequestSnapshot) -> Error {
    let outcome = TransportOutcome::from_reqwest(error);
    let detail = redact(&error.to_string());
    classify(&outcome, || ApiContext::new(snapshot))
        .unwrap_or_else(|| Error::unknown(&detail, ApiContext::default()))
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .field("rate_limited", &self.limiter.is_some())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
