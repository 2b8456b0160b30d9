//! Error types for resource operations.
//!
//! Every pipeline outcome that is not a success is a [`ResourceError`]:
//!
//! - [`ResourceError::Transport`]: no response was obtained
//! - [`ResourceError::Application`]: a response with a failing status
//! - [`ResourceError::Interceptor`]: a stage in one of the chains failed
//! - [`ResourceError::Decoding`]: the body could not be parsed as declared
//! - [`ResourceError::Cancelled`]: the caller aborted the pipeline
//!
//! Transport and application errors are offered to the error interceptor
//! chain first; the others always reach the caller unmodified.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_client::ResourceError;
//!
//! match user.get(None, None).await {
//!     Ok(user) => println!("Loaded {}", user.json()),
//!     Err(ResourceError::Application(e)) if e.status == 404 => println!("gone"),
//!     Err(ResourceError::Cancelled) => println!("aborted"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::clients::{BoxError, Headers, Response, TransportError};
use crate::error::ConfigError;

/// Identifies one of the three interceptor chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainKind {
    /// The chain applied to outgoing requests.
    Request,
    /// The chain applied to successful responses.
    Response,
    /// The chain applied to transport and application failures.
    Error,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A response whose status code indicates failure.
///
/// Carries a `name` (the status reason phrase) and a `message`, plus the
/// fields of the original response.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{name}: {message}")]
pub struct ApplicationError {
    /// The status reason phrase (e.g. "Not Found").
    pub name: String,
    /// A human-readable message, taken from the body when it has one.
    pub message: String,
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: Headers,
    /// The decoded body: JSON when declared as such, otherwise a string,
    /// or `null` when empty.
    pub body: Value,
}

impl ApplicationError {
    /// Builds the structured error from a failing response.
    ///
    /// The message is the body's `message`, `error` or `error_description`
    /// string field if present, otherwise `"<status> <reason>"`.
    #[must_use]
    pub fn from_response(response: &Response) -> Self {
        let name = response.status_text().to_string();
        let body = if response.is_empty() {
            Value::Null
        } else if response.is_json() {
            serde_json::from_slice(&response.body).unwrap_or_else(|_| Value::String(response.text()))
        } else {
            Value::String(response.text())
        };

        let message = ["message", "error", "error_description"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_str))
            .map_or_else(|| format!("{} {name}", response.status), ToString::to_string);

        Self {
            name,
            message,
            status: response.status,
            headers: response.headers.clone(),
            body,
        }
    }

    /// Returns the `X-Request-Id` header of the failing response, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get("x-request-id")
    }
}

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response was obtained but its status indicates failure.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// A stage of an interceptor chain failed.
    #[error("{chain} interceptor failed: {source}")]
    Interceptor {
        /// The chain the failing stage belongs to.
        chain: ChainKind,
        /// The error raised by the stage.
        source: BoxError,
    },

    /// The response body could not be decoded as declared.
    #[error("Failed to decode response body: {message}")]
    Decoding {
        /// What went wrong.
        message: String,
    },

    /// The request body could not be encoded.
    #[error("Failed to encode request body: {message}")]
    Encoding {
        /// What went wrong.
        message: String,
    },

    /// The pipeline was aborted before it settled.
    #[error("Request was cancelled")]
    Cancelled,

    /// A write through the transparency layer was rejected.
    #[error("Cannot set '{name}': {reason}")]
    Member {
        /// The key that was written.
        name: String,
        /// Why the write was rejected.
        reason: String,
    },

    /// A configuration value was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ResourceError {
    /// Creates an interceptor error for the given chain.
    pub fn interceptor(chain: ChainKind, source: impl Into<BoxError>) -> Self {
        Self::Interceptor {
            chain,
            source: source.into(),
        }
    }

    /// Creates a decoding error.
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the status code of an application error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Application(e) => Some(e.status),
            _ => None,
        }
    }

    /// Returns `true` for errors the error interceptor chain may handle.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Application(_))
    }

    /// Returns the request ID if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Application(e) => e.request_id(),
            _ => None,
        }
    }
}
