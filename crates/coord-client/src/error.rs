//! Client error types.

use coord_core::Condition;

/// Errors from coord server calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The server refused the update for the path's current status (409).
    #[error("update rejected: {0}")]
    Rejected(String),
    /// The wait ended without the condition being met (408).
    #[error("{path} did not become {condition}")]
    WaitFailed { path: String, condition: Condition },
    /// Any other non-2xx response.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The path cannot be appended to the server URL.
    #[error("invalid path '{0}': {1}")]
    InvalidPath(String, String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
