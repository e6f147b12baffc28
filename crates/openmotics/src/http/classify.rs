//! Mapping of transport outcomes onto the error taxonomy.

use crate::error::{ApiContext, Error};

/// What the transport layer observed for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// No response within the per-attempt timeout.
    Timeout,
    /// DNS failure, refused or reset connection, broken body stream.
    NetworkFailure(String),
    /// The server answered with this status.
    Status(u16),
}

impl TransportOutcome {
    /// Interpret a `reqwest` failure that produced no usable response.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportOutcome::Timeout
        } else if let Some(status) = error.status() {
            TransportOutcome::Status(status.as_u16())
        } else {
            // Connect, request and body errors all mean the exchange broke
            // before a status could be trusted.
            TransportOutcome::NetworkFailure(describe(error))
        }
    }
}

fn describe(error: &reqwest::Error) -> String {
    let kind = if error.is_connect() {
        "connection failed"
    } else if error.is_body() || error.is_decode() {
        "response body interrupted"
    } else if error.is_request() {
        "request could not be sent"
    } else {
        "transport error"
    };
    // reqwest's Display includes the URL; keep only the category and root cause.
    let mut source: &dyn std::error::Error = error;
    while let Some(next) = source.source() {
        source = next;
    }
    format!("{kind}: {source}")
}

/// Classify one attempt. `None` means success (2xx).
///
/// First match wins: timeout, network failure, 401/403, 429, other 4xx,
/// 5xx, then any remaining non-2xx status as unknown. `context` is only
/// evaluated when an error is produced.
pub fn classify(
    outcome: &TransportOutcome,
    context: impl FnOnce() -> ApiContext,
) -> Option<Error> {
    let status = match outcome {
        TransportOutcome::Timeout => return Some(Error::network_timeout(context())),
        TransportOutcome::NetworkFailure(detail) => {
            return Some(Error::network_unreachable(detail, context()));
        }
        TransportOutcome::Status(status) => *status,
    };

    match status {
        200..=299 => None,
        401 | 403 => Some(Error::unauthorized(context())),
        429 => Some(Error::backoff(context())),
        400..=499 => Some(Error::client_error(context())),
        500..=599 => Some(Error::server_error(context())),
        other => Some(Error::unknown(
            &format!("unexpected status {other}"),
            context(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::{RequestSnapshot, ResponseSnapshot};
    use rstest::rstest;
    use std::time::Duration;

    fn context(status: u16) -> ApiContext {
        ApiContext::new(RequestSnapshot::new("GET", "https://h/api/v1/p"))
            .with_response(ResponseSnapshot::new(status, "https://h/api/v1/p", "", Duration::ZERO))
    }

    fn kind_of(status: u16) -> Option<ErrorKind> {
        classify(&TransportOutcome::Status(status), || context(status)).map(|e| e.kind())
    }

    #[test]
    fn test_timeout_and_network_failure() {
        let timeout = classify(&TransportOutcome::Timeout, ApiContext::default);
        assert_eq!(timeout.map(|e| e.kind()), Some(ErrorKind::NetworkTimeout));

        let refused = classify(
            &TransportOutcome::NetworkFailure("connection refused".into()),
            ApiContext::default,
        )
        .map(|e| e.kind());
        assert_eq!(refused, Some(ErrorKind::NetworkUnreachable));
    }

    #[rstest]
    #[case(401, ErrorKind::Unauthorized)]
    #[case(403, ErrorKind::Unauthorized)]
    #[case(429, ErrorKind::Backoff)]
    #[case(400, ErrorKind::ClientError)]
    #[case(404, ErrorKind::ClientError)]
    #[case(422, ErrorKind::ClientError)]
    #[case(500, ErrorKind::ServerError)]
    #[case(503, ErrorKind::ServerError)]
    #[case(599, ErrorKind::ServerError)]
    #[case(100, ErrorKind::Unknown)]
    #[case(304, ErrorKind::Unknown)]
    #[case(600, ErrorKind::Unknown)]
    fn test_status_mapping(#[case] status: u16, #[case] expected: ErrorKind) {
        assert_eq!(kind_of(status), Some(expected));
    }

    #[test]
    fn test_every_client_and_server_status_is_classified() {
        for status in 400..=599u16 {
            let kind = kind_of(status).unwrap_or_else(|| panic!("{status} produced no error"));
            let expected = match status {
                401 | 403 => ErrorKind::Unauthorized,
                429 => ErrorKind::Backoff,
                400..=499 => ErrorKind::ClientError,
                _ => ErrorKind::ServerError,
            };
            assert_eq!(kind, expected, "status {status}");
        }
    }

    #[test]
    fn test_success_is_not_an_error() {
        for status in 200..=299u16 {
            assert_eq!(kind_of(status), None, "status {status}");
        }
    }

    #[test]
    fn test_classified_error_carries_snapshot() {
        let error = classify(&TransportOutcome::Status(429), || context(429)).unwrap();
        assert_eq!(error.status(), Some(429));
        let ctx = error.context().unwrap();
        assert_eq!(ctx.request.as_ref().unwrap().method, "GET");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_non_success_always_classified(status in 100u16..1000) {
                let result = kind_of(status);
                if (200..300).contains(&status) {
                    prop_assert!(result.is_none());
                } else {
                    prop_assert!(result.is_some());
                }
            }
        }
    }
}
