//! Source API error types.

use thiserror::Error;

/// Result type for source API operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur talking to the coordination API.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned unexpected status '{status}': {message}")]
    UnexpectedStatus { status: String, message: String },

    #[error("API request failed: {0}")]
    RequestFailed(String),
}

impl SourceError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn unexpected_status(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status: status.into(),
            message: message.into(),
        }
    }
}
