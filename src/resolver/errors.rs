// Error types for endpoint resolution

use thiserror::Error;

use super::models::{ServiceClass, ValidationReason};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No descriptor matched the preference table (not retryable)
    #[error("No matching stream for the selected quality and codec")]
    NoMatchingStream,

    /// Every endpoint was tried and failed
    #[error("All endpoints failed: {last_error}")]
    EndpointExhausted { last_error: String },

    /// Candidate link was rejected by the validation probe
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationReason),

    /// Connection, TLS or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Call-local timeout expired
    #[error("Request timed out")]
    Timeout,

    /// Non-2xx response
    #[error("HTTP {0}")]
    Http(u16),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Registry has no endpoint for the class
    #[error("No endpoint registered for {0}")]
    OutOfRange(ServiceClass),
}

impl ResolveError {
    /// Whether the next endpoint or candidate should be tried after this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Timeout
                | Self::Http(_)
                | Self::ValidationFailed(_)
                | Self::Parse(_)
        )
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Timeout;
        }
        if let Some(status) = e.status() {
            return Self::Http(status.as_u16());
        }
        if e.is_decode() {
            return Self::Parse(e.to_string());
        }
        Self::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<url::ParseError> for ResolveError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}
