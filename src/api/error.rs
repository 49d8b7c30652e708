//! Error types for the API client.

use thiserror::Error;

/// Errors returned by [`super::ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
