//! HTTP response descriptors.
//!
//! This module provides the [`Response`] type returned by a
//! [`Transport`](crate::clients::Transport). The body is buffered by the
//! transport; decoding it is the job of the response body handler.

use bytes::Bytes;
use reqwest::StatusCode;

use crate::clients::params::Headers;

/// A response as produced by the transport.
///
/// # Example
///
/// ```rust
/// use resource_client::clients::Response;
/// use resource_client::Headers;
///
/// let response = Response::new(
///     200,
///     Headers::from([("Content-Type", "application/json")]),
///     r#"{"id":1}"#,
/// );
///
/// assert!(response.is_ok());
/// assert!(response.is_json());
/// assert_eq!(response.status_text(), "OK");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// The raw response body.
    pub body: Bytes,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a response with a JSON body and matching content type.
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(
            status,
            Headers::from([("content-type", "application/json")]),
            body.to_string(),
        )
    }

    /// Returns `true` if the status code is in the 2xx or 3xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status <= 399
    }

    /// Returns `true` if the declared content type is JSON
    /// (`application/json` or any `+json` media type).
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.headers.get("content-type").is_some_and(|ct| {
            let media_type = ct.split(';').next().unwrap_or_default().trim();
            media_type.eq_ignore_ascii_case("application/json")
                || media_type.to_ascii_lowercase().ends_with("+json")
        })
    }

    /// Returns `true` if the response carries no body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status == 204 || self.body.is_empty()
    }

    /// Returns the canonical reason phrase for the status code.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status")
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get("x-request-id")
    }
}
