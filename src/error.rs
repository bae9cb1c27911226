//! Error types for remote platform operations.
//!
//! Errors carry a retry classification: terminal errors (missing profile,
//! missing login, denied access) propagate on first occurrence because
//! retrying cannot change the outcome, while transient errors (transport
//! failures, unexpected statuses, malformed payloads) are candidates for
//! backoff and retry.

use thiserror::Error;

/// Retry classification for a fetch error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Retryable under the backoff policy.
    Transient,
    /// Never retried - the request is fundamentally disallowed or pointless.
    Terminal,
}

/// Error types for platform fetch operations.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The target profile does not exist.
    #[error("profile @{0} does not exist")]
    ProfileNotFound(String),
    /// The endpoint requires an authenticated session we do not hold.
    #[error("login required to access this resource")]
    LoginRequired,
    /// Access denied with no path forward (private profile, blocked, etc).
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// Transport-level failure (connection reset, timeout, TLS, decode).
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),
    /// Unexpected HTTP status from the platform.
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    /// Response arrived but did not have the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),
    /// All retry attempts were consumed without success.
    #[error("gave up after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Classify this error for the retry policy.
    pub fn class(&self) -> ErrorClass {
        match self {
            FetchError::ProfileNotFound(_)
            | FetchError::LoginRequired
            | FetchError::AccessDenied(_)
            | FetchError::RetryExhausted { .. } => ErrorClass::Terminal,
            FetchError::Connection(_) | FetchError::Http(_) | FetchError::Parse(_) => {
                ErrorClass::Transient
            }
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_errors_are_not_retryable() {
        assert!(!FetchError::ProfileNotFound("ghost".into()).is_retryable());
        assert!(!FetchError::LoginRequired.is_retryable());
        assert!(!FetchError::AccessDenied("private profile".into()).is_retryable());
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(FetchError::Http(429).is_retryable());
        assert!(FetchError::Http(503).is_retryable());
        assert!(FetchError::Parse("missing data.user".into()).is_retryable());
    }

    #[test]
    fn test_exhaustion_is_terminal() {
        let err = FetchError::RetryExhausted {
            attempts: 3,
            source: Box::new(FetchError::Http(502)),
        };
        assert_eq!(err.class(), ErrorClass::Terminal);
        assert!(err.to_string().contains("gave up after 3 attempts"));
    }
}
