//! Error types for CloudGuard operations.
//!
//! The remote API reports failures inside a `200 OK` body rather than through HTTP
//! status codes, so this module separates failures by where they happened: on the
//! wire, while parsing the envelope, inside the remote service, or while projecting
//! the payload into a typed result.

use std::fmt;
use thiserror::Error;

/// Main error type for CloudGuard operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Network or IO failure before a usable response body was obtained
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Response body is not a JSON envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Envelope discriminant reported an error
    #[error("Remote rejected request ({kind}): {message}")]
    RemoteRejected {
        /// Classified rejection reason
        kind: RejectionKind,
        /// Message reported by the remote service
        message: String,
    },

    /// Envelope reported success but the payload did not match the expected shape
    #[error("Failed to decode result: {0}")]
    DecodeFailure(String),

    /// Resource not found by a client-side lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Caller input rejected before sending
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for CloudGuard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Machine code sent with authentication failures.
pub const E_UNAUTH: &str = "E_UNAUTH";
/// Machine code sent with rejected parameters.
pub const E_INVLDINPUT: &str = "E_INVLDINPUT";
/// Machine code sent once the API call quota is spent.
pub const E_MAXAPI: &str = "E_MAXAPI";

const UNAUTHORIZED_PATTERNS: &[&str] = &[
    "credential",
    "unauthori",
    "not authenticated",
    "invalid key",
    "api key",
];

const QUOTA_PATTERNS: &[&str] = &["rate limit", "exceeded", "too many", "quota"];

const INVALID_INPUT_PATTERNS: &[&str] = &["invalid input", "invalid", "missing", "must be"];

/// Reason the remote service gave for rejecting a request.
///
/// The remote API only partially exposes machine-readable codes, so the kind is
/// derived from `err_code` when present and from the free-text message otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Bad API key or account email
    Unauthorized,
    /// Parameters were missing or malformed
    InvalidInput,
    /// Call quota or rate limit exhausted
    QuotaExceeded,
    /// Anything the classifier does not recognise
    Unknown,
}

impl RejectionKind {
    /// Classify a rejection from its optional machine code and its message.
    #[must_use]
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        match code {
            Some(E_UNAUTH) => return Self::Unauthorized,
            Some(E_INVLDINPUT) => return Self::InvalidInput,
            Some(E_MAXAPI) => return Self::QuotaExceeded,
            _ => {}
        }

        let message = message.to_lowercase();
        let matches_any = |patterns: &[&str]| patterns.iter().any(|p| message.contains(p));

        // Quota first: throttling messages often mention the API key. Unauthorized
        // before InvalidInput: "invalid credentials" is an auth failure.
        if matches_any(QUOTA_PATTERNS) {
            Self::QuotaExceeded
        } else if matches_any(UNAUTHORIZED_PATTERNS) {
            Self::Unauthorized
        } else if matches_any(INVALID_INPUT_PATTERNS) {
            Self::InvalidInput
        } else {
            Self::Unknown
        }
    }

    /// Returns the kind as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidInput => "invalid_input",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Build a [`Error::RemoteRejected`] by classifying the remote message.
    #[must_use]
    pub fn rejected(code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::RemoteRejected {
            kind: RejectionKind::classify(code, &message),
            message,
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransportFailure(_) => "TRANSPORT_FAILURE",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::RemoteRejected { .. } => "REMOTE_REJECTED",
            Self::DecodeFailure(_) => "DECODE_FAILURE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns the rejection kind when the remote service refused the request.
    #[must_use]
    pub const fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Self::RemoteRejected { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure(_)
                | Self::MalformedResponse(_)
                | Self::DecodeFailure(_)
                | Self::ConfigError(_)
                | Self::RemoteRejected {
                    kind: RejectionKind::Unauthorized | RejectionKind::QuotaExceeded,
                    ..
                }
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TransportFailure(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::TransportFailure(format!("connection failed: {err}"))
        } else if err.is_builder() {
            Self::ConfigError(err.to_string())
        } else {
            Self::TransportFailure(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::TransportFailure("test".to_string()).error_code(),
            "TRANSPORT_FAILURE"
        );
        assert_eq!(
            Error::MalformedResponse("test".to_string()).error_code(),
            "MALFORMED_RESPONSE"
        );
        assert_eq!(
            Error::rejected(None, "test").error_code(),
            "REMOTE_REJECTED"
        );
        assert_eq!(
            Error::DecodeFailure("test".to_string()).error_code(),
            "DECODE_FAILURE"
        );
        assert_eq!(
            Error::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
        assert_eq!(
            Error::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::TransportFailure("connection refused".to_string());
        assert_eq!(err.to_string(), "Transport failure: connection refused");

        let err = Error::rejected(None, "Invalid credentials");
        assert_eq!(
            err.to_string(),
            "Remote rejected request (unauthorized): Invalid credentials"
        );
    }

    #[test]
    fn classify_prefers_machine_codes() {
        assert_eq!(
            RejectionKind::classify(Some(E_UNAUTH), "something odd"),
            RejectionKind::Unauthorized
        );
        assert_eq!(
            RejectionKind::classify(Some(E_INVLDINPUT), ""),
            RejectionKind::InvalidInput
        );
        assert_eq!(
            RejectionKind::classify(Some(E_MAXAPI), "invalid credentials"),
            RejectionKind::QuotaExceeded
        );
    }

    #[test]
    fn classify_falls_back_to_message() {
        assert_eq!(
            RejectionKind::classify(None, "invalid credentials"),
            RejectionKind::Unauthorized
        );
        assert_eq!(
            RejectionKind::classify(Some("E_OTHER"), "Invalid zone name"),
            RejectionKind::InvalidInput
        );
        assert_eq!(
            RejectionKind::classify(None, "Rate limit exceeded, try again later"),
            RejectionKind::QuotaExceeded
        );
        assert_eq!(
            RejectionKind::classify(None, "Something went wrong"),
            RejectionKind::Unknown
        );
    }

    #[test]
    fn classify_throttling_mentioning_key_as_quota() {
        assert_eq!(
            RejectionKind::classify(None, "Rate limit exceeded for this API key"),
            RejectionKind::QuotaExceeded
        );
        assert_eq!(
            RejectionKind::classify(None, "You have exceeded your allowed number of API calls"),
            RejectionKind::QuotaExceeded
        );
        assert_eq!(
            RejectionKind::classify(None, "Invalid API key"),
            RejectionKind::Unauthorized
        );
    }

    #[test]
    fn test_rejection_kind_accessor() {
        let err = Error::rejected(Some(E_MAXAPI), "slow down");
        assert_eq!(err.rejection_kind(), Some(RejectionKind::QuotaExceeded));
        assert_eq!(Error::NotFound("rec".to_string()).rejection_kind(), None);
    }

    #[test]
    fn test_should_log() {
        assert!(Error::TransportFailure("test".to_string()).should_log());
        assert!(Error::DecodeFailure("test".to_string()).should_log());
        assert!(Error::rejected(Some(E_UNAUTH), "bad key").should_log());

        assert!(!Error::rejected(Some(E_INVLDINPUT), "bad ttl").should_log());
        assert!(!Error::NotFound("test".to_string()).should_log());
        assert!(!Error::ValidationError("test".to_string()).should_log());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let converted: Error = err.into();
        assert!(matches!(converted, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::NotFound("test".to_string());
        let err2 = Error::NotFound("test".to_string());
        let err3 = Error::NotFound("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
