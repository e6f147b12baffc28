//! Main client implementation for the OpenMotics API

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::{
    auth::{AuthState, Credentials, Token},
    config::{ClientConfig, ConnectionPoolConfig, RateLimitConfig, RetryConfig},
    error::Result,
    http::{Body, EndpointTarget, Method, RequestBuilder, RequestExecutor, Response},
    resources::{GroupActions, Installations, Lights, Outputs, Sensors, Shutters, Thermostats},
};

/// Main client for interacting with the OpenMotics API.
///
/// The client is cheap to clone; all clones share one connection pool, one
/// token and one close state. Tokens are obtained lazily on the first request
/// unless [`authenticate`](Client::authenticate) is called explicitly.
///
/// # Example
///
/// ```rust,no_run
/// use openmotics::Client;
///
/// # async fn example() -> openmotics::Result<()> {
/// let client = Client::local_gateway("192.168.0.20", "user", "password")?;
/// let outputs = client.outputs().list(1, None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    executor: Arc<RequestExecutor>,
}

impl Client {
    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Cloud client using the client-credentials grant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`](crate::Error::Argument) if the HTTP client
    /// cannot be built.
    pub fn cloud(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::cloud(client_id, client_secret))
    }

    /// Local gateway client using the password grant over `https` on port 443.
    ///
    /// Use [`Client::builder`] for a different port or plain `http`.
    pub fn local_gateway(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(ClientConfig::local_gateway(host, username, password))
    }

    /// Create a client from a configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`](crate::Error::Argument) if credentials are
    /// missing or the endpoint cannot be resolved.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let executor = Arc::new(RequestExecutor::from_config(&config)?);
        Ok(Self {
            inner: Arc::new(ClientInner { executor }),
        })
    }

    /// Create a client from `OPENMOTICS_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    #[cfg(feature = "env")]
    #[cfg_attr(docsrs, doc(cfg(feature = "env")))]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Obtain a token now instead of on the first request.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`](crate::Error::Unauthorized) when the grant is
    /// rejected, [`Error::Unknown`](crate::Error::Unknown) for any other
    /// failure, [`Error::Closed`](crate::Error::Closed) after
    /// [`close`](Client::close).
    pub async fn authenticate(&self) -> Result<Arc<Token>> {
        self.inner.executor.tokens().authenticate().await
    }

    /// Current token lifecycle state.
    pub async fn auth_state(&self) -> AuthState {
        self.inner.executor.tokens().state().await
    }

    /// GET `path` and return the decoded body.
    ///
    /// `path` is relative to the API prefix and must start with `/`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn example(client: openmotics::Client) -> openmotics::Result<()> {
    /// let body = client
    ///     .get("/base/installations", &[("filter", "{\"name\":\"Home\"}")])
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Body> {
        Ok(self.get_raw(path, query).await?.into_body())
    }

    /// POST `path` with an optional JSON body and return the decoded body.
    ///
    /// Retryable failures are retried like any other request. The server has
    /// no way to recognise a repeated POST, so a POST whose response was lost
    /// can take effect twice (e.g. a group action triggered twice).
    pub async fn post(&self, path: &str, json: Option<Value>) -> Result<Body> {
        Ok(self.post_raw(path, json).await?.into_body())
    }

    /// Like [`get`](Client::get), keeping status, headers and retry statistics.
    pub async fn get_raw(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.request(Method::GET, path)?
            .query_pairs(query.iter().copied())
            .send()
            .await
    }

    /// Like [`post`](Client::post), keeping status, headers and retry statistics.
    pub async fn post_raw(&self, path: &str, json: Option<Value>) -> Result<Response> {
        let mut request = self.request(Method::POST, path)?;
        if let Some(json) = json {
            request = request.json(&json)?;
        }
        request.send().await
    }

    /// Create a request builder for custom requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`](crate::Error::Argument) if `path` is not a
    /// relative path starting with `/`.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        RequestBuilder::new(Arc::clone(&self.inner.executor), method, path)
    }

    /// The resolved endpoint.
    pub fn target(&self) -> &EndpointTarget {
        self.inner.executor.target()
    }

    /// Close the client: cancel pending retries, drop the token and fail
    /// every later request with [`Error::Closed`](crate::Error::Closed).
    ///
    /// Idempotent and shared by all clones.
    pub async fn close(&self) {
        self.inner.executor.close().await;
    }

    /// Whether [`close`](Client::close) has been called on any clone.
    pub fn is_closed(&self) -> bool {
        self.inner.executor.is_closed()
    }

    /// Run `f` with this client and close it afterwards.
    ///
    /// The client is closed whatever `f` returns. If the future panics or is
    /// dropped, pending and later requests are cancelled all the same.
    ///
    /// ```rust,no_run
    /// # async fn example() -> openmotics::Result<()> {
    /// let count = openmotics::Client::cloud("id", "secret")?
    ///     .scope(|client| async move {
    ///         Ok(client.installations().list(None).await?.len())
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scope<F, Fut, T>(self, f: F) -> Result<T>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let guard = CloseOnDrop(Arc::clone(&self.inner.executor));
        let result = f(self.clone()).await;
        self.close().await;
        drop(guard);
        result
    }

    /// Access the installations endpoints.
    pub fn installations(&self) -> Installations<'_> {
        Installations::new(self)
    }

    /// Access the outputs endpoints.
    pub fn outputs(&self) -> Outputs<'_> {
        Outputs::new(self)
    }

    /// Access the lights endpoints.
    pub fn lights(&self) -> Lights<'_> {
        Lights::new(self)
    }

    /// Access the sensors endpoints.
    pub fn sensors(&self) -> Sensors<'_> {
        Sensors::new(self)
    }

    /// Access the shutters endpoints.
    pub fn shutters(&self) -> Shutters<'_> {
        Shutters::new(self)
    }

    /// Access the group action endpoints.
    pub fn group_actions(&self) -> GroupActions<'_> {
        GroupActions::new(self)
    }

    /// Access the thermostat endpoints.
    pub fn thermostats(&self) -> Thermostats<'_> {
        Thermostats::new(self)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("executor", &self.inner.executor)
            .finish()
    }
}

/// Cancels the executor if a scoped future unwinds or is dropped early.
struct CloseOnDrop(Arc<RequestExecutor>);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Builder for creating a configured Client.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Authenticate against the cloud with the client-credentials grant.
    pub fn client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.config.credentials = Some(Credentials::client_credentials(client_id, client_secret));
        self
    }

    /// Authenticate against a gateway with the password grant.
    pub fn password(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::password(username, password));
        self
    }

    /// Set the credentials directly.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    /// Target a local gateway on this host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = Some(host.into());
        self
    }

    /// Set the TCP port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Use `https` (default) or `http`.
    pub fn ssl(mut self, ssl: bool) -> Self {
        self.config.ssl = ssl;
        self
    }

    /// Override scheme, host and port with a full base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the path prefix (default `/api/v1`).
    pub fn path_prefix(mut self, path_prefix: impl Into<String>) -> Self {
        self.config.path_prefix = path_prefix.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the maximum number of attempts, the first one included.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.retry.max_attempts = max_attempts;
        self
    }

    /// Refresh tokens this long before they expire.
    pub fn token_leeway(mut self, leeway: Duration) -> Self {
        self.config.token_leeway = leeway;
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Accept invalid TLS certificates (self-signed gateways).
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// Enable client-side rate limiting.
    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(rate_limit);
        self
    }

    /// Set the connection pool configuration.
    pub fn connection_pool(mut self, pool: ConnectionPoolConfig) -> Self {
        self.config.connection_pool = pool;
        self
    }

    /// Build the client with the configured options.
    pub fn build(self) -> Result<Client> {
        Client::from_config(self.config)
    }
}
