//! Transport-level error types.
//!
//! A [`TransportError`] means no usable response was obtained: the request
//! could not be sent, the connection failed, or the request timed out.
//! Responses with failing status codes are not transport errors; they are
//! classified later by the response body handler.
//!
//! # Example
//!
//! ```rust
//! use resource_client::clients::TransportError;
//!
//! let error = TransportError::Timeout {
//!     url: "https://api.example.com/users".to_string(),
//! };
//! assert!(error.to_string().contains("timed out"));
//! ```

use thiserror::Error;

/// Boxed error type accepted from user-supplied collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised before a response is obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or connection error from the HTTP stack.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request did not complete within its timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// The URL that was requested.
        url: String,
    },

    /// The method token is not a supported HTTP method.
    #[error("Invalid Http method {method}.")]
    InvalidMethod {
        /// The method that was provided.
        method: String,
    },

    /// A header name or value cannot be sent.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },

    /// A failure reported by a custom transport.
    #[error("Transport failed: {0}")]
    Custom(BoxError),
}

impl TransportError {
    /// Wraps an arbitrary error from a custom transport.
    pub fn custom(error: impl Into<BoxError>) -> Self {
        Self::Custom(error.into())
    }
}
