//! Error types for 4get client operations
//!
//! Every failure surfaces as a [`FourGetError`]. Callers that only care about
//! the broad class of failure (for retry decisions or reporting) use
//! [`FourGetError::kind`].

use thiserror::Error;

use crate::config::ConfigError;

/// Broad failure classes reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream kept answering 429 after all retries
    Auth,
    /// Upstream answered with a well-formed envelope whose status is not "ok"
    Api,
    /// Network, timeout, non-2xx status, or undecodable body
    Transport,
    /// Malformed envelope or broken internal invariant
    Generic,
    /// Invalid client configuration
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::Api => "api",
            ErrorKind::Transport => "transport",
            ErrorKind::Generic => "generic",
            ErrorKind::Config => "config",
        }
    }
}

/// Errors that can occur when calling the 4get API
#[derive(Error, Debug)]
pub enum FourGetError {
    /// Rate limited (HTTP 429) on every attempt, or the pass token was rejected
    #[error("{0}")]
    Auth(String),

    /// The API returned a status other than "ok"
    #[error("status={status}{}", api_suffix(.message))]
    Api {
        /// Value of the envelope's `status` field
        status: String,
        /// First of `message`, `error`, `detail` present in the envelope
        message: Option<String>,
    },

    /// Upstream answered with a non-success HTTP status other than 429
    #[error("HTTP status {status} from {url}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,
        /// The request URL
        url: String,
    },

    /// The request could not be sent or the response could not be read
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not valid JSON
    #[error("invalid JSON in 4get response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Envelope is malformed or the client hit an impossible state
    #[error("{0}")]
    Client(String),

    /// The configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FourGetError {
    /// The failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FourGetError::Auth(_) => ErrorKind::Auth,
            FourGetError::Api { .. } => ErrorKind::Api,
            FourGetError::HttpStatus { .. }
            | FourGetError::Request(_)
            | FourGetError::Decode(_) => ErrorKind::Transport,
            FourGetError::Client(_) => ErrorKind::Generic,
            FourGetError::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether another attempt may succeed: rate limits, connect failures and timeouts
    pub fn is_retryable(&self) -> bool {
        match self {
            FourGetError::Auth(_) => true,
            FourGetError::Request(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

fn api_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Result type alias for 4get operations
pub type FourGetResult<T> = Result<T, FourGetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_message() {
        let err = FourGetError::Api {
            status: "error".to_string(),
            message: Some("Something went wrong".to_string()),
        };
        assert_eq!(err.to_string(), "status=error: Something went wrong");
        assert_eq!(err.kind(), ErrorKind::Api);
    }

    #[test]
    fn test_api_error_display_without_message() {
        let err = FourGetError::Api {
            status: "denied".to_string(),
            message: None,
        };
        assert_eq!(err.to_string(), "status=denied");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(FourGetError::Auth("x".into()).kind(), ErrorKind::Auth);
        assert_eq!(FourGetError::Client("x".into()).kind(), ErrorKind::Generic);
        let status = FourGetError::HttpStatus {
            status: 404,
            url: "https://example.test/api/v1/web".into(),
        };
        assert_eq!(status.kind(), ErrorKind::Transport);
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(FourGetError::from(decode).kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_retryable() {
        assert!(FourGetError::Auth("rate limited".into()).is_retryable());
        assert!(!FourGetError::Client("missing status".into()).is_retryable());
        assert!(!FourGetError::HttpStatus {
            status: 500,
            url: String::new(),
        }
        .is_retryable());
    }
}
