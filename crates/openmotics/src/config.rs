//! Configuration for the OpenMotics client

use crate::auth::Credentials;
use openmotics_core::retry::{ExponentialBackoff, Jitter};
use std::time::Duration;

/// Configuration for the OpenMotics client.
///
/// A configuration without a `host` targets the cloud API; setting a host
/// targets a local gateway on that address.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway host name or IP; `None` means the cloud host
    pub host: Option<String>,

    /// TCP port
    pub port: u16,

    /// Use `https` instead of `http`
    pub ssl: bool,

    /// Full base URL (scheme, host, port), overriding `host`/`port`/`ssl`
    pub base_url: Option<String>,

    /// Path prepended to every request path
    pub path_prefix: String,

    /// Grant credentials
    pub credentials: Option<Credentials>,

    /// Per-attempt request timeout
    pub timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Option<Duration>,

    /// Retry policy for retryable failures
    pub retry: RetryConfig,

    /// A token is refreshed when it expires within this window
    pub token_leeway: Duration,

    /// `User-Agent` header value
    pub user_agent: Option<String>,

    /// Accept self-signed or otherwise invalid TLS certificates
    pub accept_invalid_certs: bool,

    /// Client-side rate limiting; off when `None`
    pub rate_limit: Option<RateLimitConfig>,

    /// Connection pool configuration
    pub connection_pool: ConnectionPoolConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 443,
            ssl: true,
            base_url: None,
            path_prefix: crate::API_PREFIX.to_string(),
            credentials: None,
            timeout: Duration::from_secs(15),
            connect_timeout: None,
            retry: RetryConfig::default(),
            token_leeway: Duration::from_secs(30),
            user_agent: None,
            accept_invalid_certs: false,
            rate_limit: None,
            connection_pool: ConnectionPoolConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Cloud configuration using the client-credentials grant.
    pub fn cloud(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials::client_credentials(client_id, client_secret)),
            ..Default::default()
        }
    }

    /// Local gateway configuration using the password grant.
    pub fn local_gateway(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: Some(host.into()),
            credentials: Some(Credentials::password(username, password)),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present. This
    /// will look for:
    /// - `OPENMOTICS_HOST` for a local gateway (cloud when unset)
    /// - `OPENMOTICS_PORT` and `OPENMOTICS_SSL`
    /// - `OPENMOTICS_CLIENT_ID` and `OPENMOTICS_CLIENT_SECRET` for the cloud grant
    /// - `OPENMOTICS_USERNAME` and `OPENMOTICS_PASSWORD` for the gateway grant
    /// - `OPENMOTICS_TIMEOUT` for the per-attempt timeout (in seconds)
    ///
    /// Client credentials take precedence when both pairs are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`](crate::Error::Argument) if a numeric or
    /// boolean variable cannot be parsed.
    #[cfg(feature = "env")]
    pub fn from_env() -> crate::Result<Self> {
        use std::env;

        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(host) = env::var("OPENMOTICS_HOST")
            && !host.trim().is_empty()
        {
            config.host = Some(host);
        }

        if let Ok(port) = env::var("OPENMOTICS_PORT") {
            config.port = port.trim().parse().map_err(|_| {
                crate::Error::Argument(format!("OPENMOTICS_PORT is not a valid port: {port:?}"))
            })?;
        }

        if let Ok(ssl) = env::var("OPENMOTICS_SSL") {
            config.ssl = parse_bool(&ssl).ok_or_else(|| {
                crate::Error::Argument(format!("OPENMOTICS_SSL is not a boolean: {ssl:?}"))
            })?;
        }

        if let Ok(timeout) = env::var("OPENMOTICS_TIMEOUT") {
            let secs: u64 = timeout.trim().parse().map_err(|_| {
                crate::Error::Argument(format!(
                    "OPENMOTICS_TIMEOUT is not a number of seconds: {timeout:?}"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        let client = (
            env::var("OPENMOTICS_CLIENT_ID"),
            env::var("OPENMOTICS_CLIENT_SECRET"),
        );
        let user = (
            env::var("OPENMOTICS_USERNAME"),
            env::var("OPENMOTICS_PASSWORD"),
        );
        config.credentials = match (client, user) {
            ((Ok(id), Ok(secret)), _) => Some(Credentials::client_credentials(id, secret)),
            (_, (Ok(username), Ok(password))) => Some(Credentials::password(username, password)),
            _ => None,
        };

        Ok(config)
    }
}

#[cfg(feature = "env")]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Retry policy for retryable failures.
///
/// Defaults: 10 attempts, 300s budget, full-jitter exponential waits with a
/// 1s multiplier capped at 30s.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: u32,

    /// Wall-clock budget from the first attempt; `None` for no limit
    pub max_elapsed: Option<Duration>,

    /// Base of the exponential wait
    pub multiplier: Duration,

    /// Cap on any single wait
    pub max_delay: Duration,

    /// Jitter mode
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            max_elapsed: Some(Duration::from_secs(300)),
            multiplier: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Jitter::Full,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub(crate) fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .max_attempts(self.max_attempts)
            .max_elapsed(self.max_elapsed)
            .multiplier(self.multiplier)
            .max_delay(self.max_delay)
            .jitter(self.jitter)
            .build()
    }
}

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone)]
pub struct ConnectionPoolConfig {
    /// Maximum number of idle connections per host
    pub max_idle_per_host: usize,

    /// Idle connection timeout
    pub idle_timeout: Duration,

    /// TCP keep-alive interval
    pub tcp_keepalive: Option<Duration>,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

/// Configuration for client-side rate limiting.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,

    /// Burst size for the token bucket
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.host.is_none());
        assert_eq!(config.port, 443);
        assert!(config.ssl);
        assert_eq!(config.path_prefix, "/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.token_leeway, Duration::from_secs(30));
        assert!(config.rate_limit.is_none());
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_default_retry_config() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 10);
        assert_eq!(retry.max_elapsed, Some(Duration::from_secs(300)));
        assert_eq!(retry.multiplier, Duration::from_secs(1));
        assert_eq!(retry.max_delay, Duration::from_secs(30));
        assert_eq!(RetryConfig::disabled().max_attempts, 1);
    }

    #[test]
    fn test_shortcuts() {
        let cloud = ClientConfig::cloud("id", "secret");
        assert!(cloud.host.is_none());
        assert_matches!(cloud.credentials, Some(Credentials::ClientCredentials { .. }));

        let local = ClientConfig::local_gateway("192.168.0.10", "admin", "pw");
        assert_eq!(local.host.as_deref(), Some("192.168.0.10"));
        assert_matches!(local.credentials, Some(Credentials::Password { .. }));
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_variables() {
        temp_env::with_vars(
            [
                ("OPENMOTICS_HOST", Some("10.0.0.5")),
                ("OPENMOTICS_PORT", Some("8443")),
                ("OPENMOTICS_SSL", Some("false")),
                ("OPENMOTICS_TIMEOUT", Some("20")),
                ("OPENMOTICS_CLIENT_ID", None),
                ("OPENMOTICS_CLIENT_SECRET", None),
                ("OPENMOTICS_USERNAME", Some("admin")),
                ("OPENMOTICS_PASSWORD", Some("pw")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.host.as_deref(), Some("10.0.0.5"));
                assert_eq!(config.port, 8443);
                assert!(!config.ssl);
                assert_eq!(config.timeout, Duration::from_secs(20));
                assert_matches!(
                    config.credentials,
                    Some(Credentials::Password { ref username, .. }) if username == "admin"
                );
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_rejects_bad_port() {
        temp_env::with_vars([("OPENMOTICS_PORT", Some("not-a-port"))], || {
            assert_matches!(ClientConfig::from_env(), Err(crate::Error::Argument(_)));
        });
    }
}
