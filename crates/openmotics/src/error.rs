//! Error types for the OpenMotics client
//!
//! Every failure that leaves the request pipeline is one member of a closed
//! taxonomy. Network-level variants carry an [`ApiContext`] holding a
//! sanitized snapshot of the request and, when one arrived, the response.

use crate::http::{RequestSnapshot, ResponseSnapshot};
use openmotics_core::retry::RetryableError;
use thiserror::Error;

/// Result type alias for operations that can fail with an OpenMotics error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the OpenMotics client.
#[derive(Debug, Error)]
pub enum Error {
    /// The request timed out before the server answered.
    #[error("{message}")]
    NetworkTimeout {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// The server could not be reached (DNS, refused, reset).
    #[error("{message}")]
    NetworkUnreachable {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// The server answered 401 or 403, or the token grant was rejected.
    #[error("{message}")]
    Unauthorized {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// The server answered 429 Too Many Requests.
    #[error("{message}")]
    Backoff {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// The server answered with any other 4xx status.
    #[error("{message}")]
    ClientError {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// The server answered with a 5xx status.
    #[error("{message}")]
    ServerError {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// Any other failure: unexpected status, failed token exchange, unreadable body.
    #[error("{message}")]
    Unknown {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// The server answered 2xx but the payload could not be decoded.
    #[error("{message}")]
    InvalidResponse {
        /// Actionable description
        message: String,
        /// Sanitized request/response snapshot
        context: Box<ApiContext>,
    },

    /// An argument or configuration value was rejected before any network call.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The client was closed, or the request was cancelled while in flight.
    #[error("Client is closed; create a new client to issue further requests")]
    Closed,
}

/// Discriminant of [`Error`], used for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::NetworkTimeout`]
    NetworkTimeout,
    /// See [`Error::NetworkUnreachable`]
    NetworkUnreachable,
    /// See [`Error::Unauthorized`]
    Unauthorized,
    /// See [`Error::Backoff`]
    Backoff,
    /// See [`Error::ClientError`]
    ClientError,
    /// See [`Error::ServerError`]
    ServerError,
    /// See [`Error::Unknown`]
    Unknown,
    /// See [`Error::InvalidResponse`]
    InvalidResponse,
    /// See [`Error::Argument`]
    Argument,
    /// See [`Error::Closed`]
    Closed,
}

impl ErrorKind {
    /// Whether the retry policy may re-attempt a request that failed this way.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkTimeout
                | ErrorKind::NetworkUnreachable
                | ErrorKind::ServerError
                | ErrorKind::Unknown
        )
    }
}

/// Sanitized request/response snapshot attached to network-level errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiContext {
    /// The request that triggered the error, if it was built
    pub request: Option<RequestSnapshot>,
    /// The response, if the server answered
    pub response: Option<ResponseSnapshot>,
}

impl ApiContext {
    /// Context for a request that got no response.
    pub fn new(request: RequestSnapshot) -> Self {
        Self {
            request: Some(request),
            response: None,
        }
    }

    /// Attach the response snapshot.
    pub fn with_response(mut self, response: ResponseSnapshot) -> Self {
        self.response = Some(response);
        self
    }

    fn status_suffix(&self) -> String {
        match &self.response {
            Some(response) => format!(" (status {})", response.status),
            None => String::new(),
        }
    }
}

impl Error {
    pub(crate) fn network_timeout(context: ApiContext) -> Self {
        Error::NetworkTimeout {
            message: "Request timed out while accessing the API. Retry the request with a \
                      longer timeout and check the network if the issue persists."
                .to_string(),
            context: Box::new(context),
        }
    }

    pub(crate) fn network_unreachable(detail: &str, context: ApiContext) -> Self {
        Error::NetworkUnreachable {
            message: format!(
                "Network error while accessing the API: {detail}. Retry the request or \
                 check the network if the issue persists."
            ),
            context: Box::new(context),
        }
    }

    pub(crate) fn unauthorized(context: ApiContext) -> Self {
        Error::Unauthorized {
            message: format!(
                "Access token is invalid or expired{}. Refresh the access token and try again.",
                context.status_suffix()
            ),
            context: Box::new(context),
        }
    }

    pub(crate) fn backoff(context: ApiContext) -> Self {
        Error::Backoff {
            message: format!(
                "Client is sending too many requests{}. Reduce the frequency at which the API \
                 is accessed and try again.",
                context.status_suffix()
            ),
            context: Box::new(context),
        }
    }

    pub(crate) fn client_error(context: ApiContext) -> Self {
        Error::ClientError {
            message: format!(
                "Server processed the request and returned a 4xx response{}. Don't retry the \
                 request without changing the arguments as it will fail again.",
                context.status_suffix()
            ),
            context: Box::new(context),
        }
    }

    pub(crate) fn server_error(context: ApiContext) -> Self {
        Error::ServerError {
            message: format!(
                "Server couldn't process the request and returned a 5xx response{}. Try again \
                 with a reasonable backoff.",
                context.status_suffix()
            ),
            context: Box::new(context),
        }
    }

    pub(crate) fn unknown(detail: &str, context: ApiContext) -> Self {
        Error::Unknown {
            message: format!(
                "Unknown response error{}: {detail}. Check the log for more details.",
                context.status_suffix()
            ),
            context: Box::new(context),
        }
    }

    pub(crate) fn invalid_response(detail: &str, context: ApiContext) -> Self {
        Error::InvalidResponse {
            message: format!("Server returned a payload that could not be decoded: {detail}"),
            context: Box::new(context),
        }
    }

    /// The taxonomy member of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NetworkTimeout { .. } => ErrorKind::NetworkTimeout,
            Error::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
            Error::Unauthorized { .. } => ErrorKind::Unauthorized,
            Error::Backoff { .. } => ErrorKind::Backoff,
            Error::ClientError { .. } => ErrorKind::ClientError,
            Error::ServerError { .. } => ErrorKind::ServerError,
            Error::Unknown { .. } => ErrorKind::Unknown,
            Error::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Error::Argument(_) => ErrorKind::Argument,
            Error::Closed => ErrorKind::Closed,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// The sanitized request/response snapshot, for network-level errors.
    pub fn context(&self) -> Option<&ApiContext> {
        match self {
            Error::NetworkTimeout { context, .. }
            | Error::NetworkUnreachable { context, .. }
            | Error::Unauthorized { context, .. }
            | Error::Backoff { context, .. }
            | Error::ClientError { context, .. }
            | Error::ServerError { context, .. }
            | Error::Unknown { context, .. }
            | Error::InvalidResponse { context, .. } => Some(&**context),
            Error::Argument(_) | Error::Closed => None,
        }
    }

    /// HTTP status of the response that triggered this error, if any.
    pub fn status(&self) -> Option<u16> {
        self.context()
            .and_then(|context| context.response.as_ref())
            .map(|response| response.status)
    }
}

impl RetryableError for Error {
    fn is_retryable(&self) -> bool {
        Error::is_retryable(self)
    }

    fn cancelled() -> Self {
        Error::Closed
    }
}
