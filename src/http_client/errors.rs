//! Error types for tracked HTTP requests

use thiserror::Error;

/// Result type alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures surfaced by [`TrackedClient`](super::TrackedClient).
///
/// Instrumentation never produces these; they describe the request itself and
/// reach the caller unchanged after the interceptors have settled.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The path could not be joined onto the configured base URL
    #[error("Invalid request URL '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, TLS, timeout or body streaming failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    /// The request body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body did not match the expected shape
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The call needs a session token and none is stored
    #[error("Not logged in")]
    MissingToken,

    /// Input rejected before anything was sent
    #[error("{0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ApiError {
    /// HTTP status for `Status` errors
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403)) || matches!(self, Self::MissingToken)
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
