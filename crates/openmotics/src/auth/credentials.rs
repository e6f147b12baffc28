//! OAuth2 grant credentials.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Scope requested for every grant.
pub const DEFAULT_SCOPE: &str = "control view";

/// Credentials used to obtain a bearer token.
///
/// The cloud API uses the client-credentials grant; a local gateway uses
/// the resource-owner password grant.
#[derive(Clone)]
pub enum Credentials {
    /// `grant_type=client_credentials` (cloud)
    ClientCredentials {
        /// OAuth2 client id
        client_id: String,
        /// OAuth2 client secret
        client_secret: SecretString,
    },
    /// `grant_type=password` (local gateway)
    Password {
        /// Gateway user name
        username: String,
        /// Gateway password
        password: SecretString,
    },
}

impl Credentials {
    /// Client-credentials grant.
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into().into_boxed_str()),
        }
    }

    /// Password grant.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            username: username.into(),
            password: SecretString::new(password.into().into_boxed_str()),
        }
    }

    /// The OAuth2 `grant_type` value.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Credentials::ClientCredentials { .. } => "client_credentials",
            Credentials::Password { .. } => "password",
        }
    }

    /// Who the grant is for, safe to log.
    pub fn principal(&self) -> &str {
        match self {
            Credentials::ClientCredentials { client_id, .. } => client_id,
            Credentials::Password { username, .. } => username,
        }
    }

    /// `application/x-www-form-urlencoded` body for the token endpoint.
    ///
    /// The result contains the secret in clear text; it must only be sent,
    /// never logged.
    pub(crate) fn form_body(&self) -> String {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", self.grant_type());
        match self {
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => {
                form.append_pair("client_id", client_id);
                form.append_pair("client_secret", client_secret.expose_secret());
            }
            Credentials::Password { username, password } => {
                form.append_pair("username", username);
                form.append_pair("password", password.expose_secret());
            }
        }
        form.append_pair("scope", DEFAULT_SCOPE);
        form.finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}
