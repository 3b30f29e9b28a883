//! Client error type.

use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request. `message` is the server's own text.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The call needs a session and none is active.
    #[error("Not signed in")]
    NotAuthenticated,

    /// A form failed client-side validation.
    #[error("{0}")]
    Validation(String),

    /// The configured server URL cannot be used.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// The response cache refused an invalidation.
    #[error("Cache error: {0}")]
    Cache(#[from] moka::PredicateError),
}

impl ClientError {
    /// HTTP status of a server rejection, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
