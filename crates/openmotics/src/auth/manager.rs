//! Token lifecycle management
//!
//! Holds the current bearer token and obtains a new one when it is missing,
//! expired or rejected:
//! - Readers take an `Arc<Token>` snapshot under a read lock
//! - Refreshes are serialized by a gate so concurrent callers share one exchange
//! - `close()` is terminal

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use http::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use super::credentials::Credentials;
use super::token::{OAuthErrorResponse, Token, TokenResponse};
use crate::error::{ApiContext, Error, Result};
use crate::http::{RequestSnapshot, ResponseSnapshot, TransportOutcome};

/// Externally visible token lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token has been obtained yet.
    Unauthenticated,
    /// A token is held and is not about to expire.
    Authenticated,
    /// A token is held but has expired or was rejected by the API.
    Expired,
    /// The manager was closed; no further tokens will be issued.
    Closed,
}

enum TokenState {
    Unauthenticated,
    Authenticated(Arc<Token>),
    Rejected,
    Closed,
}

/// Obtains, caches and refreshes the OAuth2 bearer token.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: Url,
    credentials: Credentials,
    leeway_seconds: i64,
    timeout: Duration,
    state: RwLock<TokenState>,
    refresh_gate: Mutex<()>,
    generation: AtomicU64,
    closed: AtomicBool,
}

impl TokenManager {
    /// Create a manager that exchanges `credentials` at `token_url`.
    pub fn new(
        http: reqwest::Client,
        token_url: Url,
        credentials: Credentials,
        leeway: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            token_url,
            credentials,
            leeway_seconds: i64::try_from(leeway.as_secs()).unwrap_or(i64::MAX),
            timeout,
            state: RwLock::new(TokenState::Unauthenticated),
            refresh_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// The token endpoint.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> AuthState {
        if self.is_closed() {
            return AuthState::Closed;
        }
        match &*self.state.read().await {
            TokenState::Unauthenticated => AuthState::Unauthenticated,
            TokenState::Authenticated(token) if token.is_expired(self.leeway_seconds) => {
                AuthState::Expired
            }
            TokenState::Authenticated(_) => AuthState::Authenticated,
            TokenState::Rejected => AuthState::Expired,
            TokenState::Closed => AuthState::Closed,
        }
    }

    /// Exchange the credentials for a new token, replacing any current one.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthorized`] if the grant is rejected
    /// - [`Error::Unknown`] for transport failures, 5xx answers and unreadable payloads
    /// - [`Error::Closed`] after [`close`](Self::close)
    ///
    /// The stored state is left unchanged on failure.
    pub async fn authenticate(&self) -> Result<Arc<Token>> {
        self.ensure_open().await?;
        let _gate = self.refresh_gate.lock().await;
        self.refresh().await
    }

    /// A valid token, authenticating first if none is held or it has expired.
    ///
    /// Concurrent callers that find the token missing wait for a single
    /// in-flight exchange and share its result.
    pub async fn token(&self) -> Result<Arc<Token>> {
        if let Some(token) = self.current().await? {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;
        // Another caller may have refreshed while we waited on the gate.
        if let Some(token) = self.current().await? {
            return Ok(token);
        }
        self.refresh().await
    }

    /// Mark the token of `generation` as rejected by the API.
    ///
    /// Returns `false` if a newer token already replaced it.
    pub async fn invalidate(&self, generation: u64) -> bool {
        let mut state = self.state.write().await;
        match &*state {
            TokenState::Authenticated(token) if token.generation() == generation => {
                debug!(generation, "Access token rejected by API, forcing re-authentication");
                *state = TokenState::Rejected;
                true
            }
            _ => false,
        }
    }

    /// Drop the token and refuse further exchanges.
    pub async fn close(&self) {
        self.mark_closed();
        let mut state = self.state.write().await;
        if !matches!(*state, TokenState::Closed) {
            info!("Token manager closed");
        }
        *state = TokenState::Closed;
    }

    /// Refuse further exchanges without waiting for the state lock.
    ///
    /// The held token becomes unreachable; [`close`](Self::close) also drops it.
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        match &*self.state.read().await {
            TokenState::Closed => Err(Error::Closed),
            _ => Ok(()),
        }
    }

    async fn current(&self) -> Result<Option<Arc<Token>>> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        match &*self.state.read().await {
            TokenState::Closed => Err(Error::Closed),
            TokenState::Authenticated(token) if !token.is_expired(self.leeway_seconds) => {
                Ok(Some(Arc::clone(token)))
            }
            TokenState::Authenticated(token) => {
                debug!(generation = token.generation(), "Access token expired");
                Ok(None)
            }
            TokenState::Unauthenticated | TokenState::Rejected => Ok(None),
        }
    }

    /// Must be called with the refresh gate held.
    async fn refresh(&self) -> Result<Arc<Token>> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = Arc::new(self.exchange(generation).await?);

        let mut state = self.state.write().await;
        if self.is_closed() || matches!(*state, TokenState::Closed) {
            return Err(Error::Closed);
        }
        *state = TokenState::Authenticated(Arc::clone(&token));

        info!(
            grant_type = self.credentials.grant_type(),
            generation,
            expires_at = ?token.expires_at(),
            "Obtained access token"
        );
        Ok(token)
    }

    async fn exchange(&self, generation: u64) -> Result<Token> {
        let body = self.credentials.form_body();
        let request = RequestSnapshot::new("POST", self.token_url.as_str()).with_body(&body);
        let started = Instant::now();

        debug!(
            url = %request.url,
            grant_type = self.credentials.grant_type(),
            principal = self.credentials.principal(),
            generation,
            "Requesting access token"
        );

        let response = self
            .http
            .post(self.token_url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let detail = match TransportOutcome::from_reqwest(&e) {
                    TransportOutcome::Timeout => "token request timed out".to_string(),
                    TransportOutcome::NetworkFailure(detail) => detail,
                    TransportOutcome::Status(status) => format!("status {status}"),
                };
                warn!(error = %detail, "Token exchange failed");
                token_failure(&detail, ApiContext::new(request.clone()))
            })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let text = response.text().await.map_err(|e| {
            let context = ApiContext::new(request.clone()).with_response(ResponseSnapshot::new(
                status,
                &final_url,
                "",
                started.elapsed(),
            ));
            token_failure(&format!("failed to read token response: {e}"), context)
        })?;
        let context = ApiContext::new(request).with_response(ResponseSnapshot::new(
            status,
            &final_url,
            &text,
            started.elapsed(),
        ));

        // An OAuth error body on a 5xx is a server fault, not a rejected grant.
        let oauth_error = serde_json::from_str::<OAuthErrorResponse>(&text)
            .ok()
            .filter(|_| !(500..600).contains(&status));
        if matches!(status, 401 | 403) || oauth_error.is_some() {
            let reason = oauth_error
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or_else(|| format!("status {status}"));
            warn!(status, reason = %reason, "Token grant rejected");
            return Err(Error::Unauthorized {
                message: format!(
                    "Token endpoint rejected the {} grant ({reason}). Check the configured \
                     credentials and try again.",
                    self.credentials.grant_type()
                ),
                context: Box::new(context),
            });
        }

        if !(200..300).contains(&status) {
            warn!(status, "Token endpoint returned an error status");
            return Err(token_failure(&format!("status {status}"), context));
        }

        let payload: TokenResponse = serde_json::from_str(&text).map_err(|e| {
            token_failure(&format!("unreadable token payload: {e}"), context)
        })?;
        Ok(Token::from_response(payload, generation))
    }
}

fn token_failure(detail: &str, context: ApiContext) -> Error {
    Error::Unknown {
        message: format!(
            "Could not obtain an access token: {detail}. Retry later or check the network \
             if the issue persists."
        ),
        context: Box::new(context),
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url.as_str())
            .field("credentials", &self.credentials)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish_non_exhaustive()
    }
}
