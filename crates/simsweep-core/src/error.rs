//! Error types for selection and configuration.

use thiserror::Error;

/// Errors raised when the operator adds a directory to the selection.
///
/// These are reported inline and never change the selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The path does not start with the path separator.
    #[error("Not an absolute path: {path}")]
    NotAbsolute { path: String },

    /// The normalized path is already selected.
    #[error("Already selected: {path}")]
    Duplicate { path: String },
}

impl SelectionError {
    /// The offending path.
    pub fn path(&self) -> &str {
        match self {
            Self::NotAbsolute { path } | Self::Duplicate { path } => path,
        }
    }
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The server base URL is empty or not http(s).
    #[error("Invalid server URL: {url}")]
    InvalidBaseUrl { url: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl From<crate::config::ClientConfigBuilderError> for ConfigError {
    fn from(err: crate::config::ClientConfigBuilderError) -> Self {
        Self::Invalid {
            message: err.to_string(),
        }
    }
}
