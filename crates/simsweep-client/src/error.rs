//! Error types for backend calls.

use thiserror::Error;

/// Result type for backend calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be decoded.
    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The backend answered with its error envelope.
    #[error("Server error: {message}")]
    Server { message: String },

    /// The backend answered with a non-success status.
    #[error("{url} rejected the request: {status} {reason}")]
    Rejected {
        url: String,
        status: u16,
        reason: String,
    },
}

impl ClientError {
    /// Whether the backend actively refused the request, as opposed to a
    /// network or decoding failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Short message for a status line.
    pub fn summary(&self) -> String {
        match self {
            Self::Transport { source, .. } => format!("Network error: {source}"),
            Self::Decode { message, .. } => format!("Bad response: {message}"),
            Self::Server { message } => message.clone(),
            Self::Rejected { status, reason, .. } => format!("{status} {reason}"),
        }
    }
}
