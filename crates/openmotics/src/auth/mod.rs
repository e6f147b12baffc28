//! OAuth2 authentication
//!
//! The cloud API and local gateways both issue bearer tokens from
//! `POST {base}/api/v1/authentication/oauth2/token`; they differ only in the
//! grant used ([`Credentials`]).

mod credentials;
mod manager;
mod token;

pub use credentials::{Credentials, DEFAULT_SCOPE};
pub use manager::{AuthState, TokenManager};
pub use token::Token;
