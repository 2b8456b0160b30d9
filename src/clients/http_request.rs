//! HTTP request descriptors.
//!
//! This module provides the [`Request`] descriptor handed to a
//! [`Transport`](crate::clients::Transport), the [`Method`] enum and the
//! transport-ready [`Payload`] produced by the request body handler.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;

use crate::clients::errors::TransportError;
use crate::clients::params::{Headers, QueryParams};

/// HTTP methods a resource node can issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP PATCH method for partially updating resources.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
    /// HTTP HEAD method.
    Head,
    /// HTTP OPTIONS method.
    Options,
    /// HTTP TRACE method.
    Trace,
}

impl Method {
    /// Returns the uppercase method token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            _ => Err(TransportError::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// A transport-ready request body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// A serialized JSON document (`application/json`).
    Json(String),
    /// URL-encoded form fields (`application/x-www-form-urlencoded`).
    Form(QueryParams),
    /// Plain text (`text/plain`).
    Text(String),
    /// Raw bytes with an optional content type.
    Bytes {
        /// The body bytes.
        data: Bytes,
        /// The declared content type, if any.
        content_type: Option<String>,
    },
}

impl Payload {
    /// Returns the content type implied by the payload, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some("application/json"),
            Self::Form(_) => Some("application/x-www-form-urlencoded"),
            Self::Text(_) => Some("text/plain;charset=UTF-8"),
            Self::Bytes { content_type, .. } => content_type.as_deref(),
        }
    }

    /// Returns `true` if there is no body.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the body as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Empty => Bytes::new(),
            Self::Json(s) | Self::Text(s) => Bytes::from(s.clone()),
            Self::Form(fields) => Bytes::from(fields.to_query_string()),
            Self::Bytes { data, .. } => data.clone(),
        }
    }
}

/// A fully built request, as seen by request interceptors and the transport.
///
/// `url` never carries a query string. The transport renders `query` and
/// the payload's implied `Content-Type` when it sends the request, so an
/// interceptor may edit any field directly.
///
/// # Example
///
/// ```rust
/// use resource_client::clients::{Method, Payload, Request};
///
/// let request = Request::builder(Method::Get, "https://api.example.com/users")
///     .query_param("page", "2")
///     .header("Accept", "application/json")
///     .body(Payload::Text("hi".to_string()))
///     .build();
///
/// assert_eq!(request.url, "https://api.example.com/users");
/// assert_eq!(request.full_url(), "https://api.example.com/users?page=2");
/// assert_eq!(request.headers.get("accept"), Some("application/json"));
/// assert_eq!(request.content_type(), Some("text/plain;charset=UTF-8"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL, without a query string.
    pub url: String,
    /// The query parameters sent with the request.
    pub query: QueryParams,
    /// Request headers.
    pub headers: Headers,
    /// The request body.
    pub body: Payload,
    /// Optional per-request timeout enforced by the transport.
    pub timeout: Option<Duration>,
}

impl Request {
    /// Creates a new builder for a request.
    #[must_use]
    pub fn builder(method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// Returns the URL with the current query parameters rendered onto it.
    #[must_use]
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.query.to_query_string())
        }
    }

    /// Returns the content type the request is sent with: an explicit
    /// `Content-Type` header wins over the one the body implies.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get("content-type")
            .or_else(|| self.body.content_type())
    }
}

/// Builder for [`Request`] instances.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    query: QueryParams,
    headers: Headers,
    body: Payload,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: QueryParams::new(),
            headers: Headers::new(),
            body: Payload::Empty,
            timeout: None,
        }
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(key, value);
        self
    }

    /// Sets all headers at once.
    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a single header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: Payload) -> Self {
        self.body = body;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            query: self.query,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
        }
    }
}
