//! Transports: the primitive that turns a [`Request`] into a [`Response`].
//!
//! The resource layer never talks to the network directly; it hands fully
//! built requests to whatever [`Transport`] is configured. [`ReqwestTransport`]
//! is the default. [`FnTransport`] adapts an async closure, which is handy for
//! tests and for routing requests through an existing HTTP stack.
//!
//! Cancellation is cooperative: when a pipeline is aborted the in-flight
//! `fetch` future is dropped, which for [`ReqwestTransport`] closes the
//! underlying request.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};

use crate::clients::errors::TransportError;
use crate::clients::http_request::Request;
use crate::clients::http_response::Response;
use crate::clients::params::Headers;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sends requests and buffers responses.
///
/// Implementations must classify only transport failures as errors; a
/// response with any status code is returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request.
    async fn fetch(&self, request: Request) -> Result<Response, TransportError>;
}

/// A transport shared between configuration snapshots.
pub type SharedTransport = Arc<dyn Transport>;

/// The default transport, backed by `reqwest`.
///
/// # Example
///
/// ```rust,ignore
/// use resource_client::clients::{Method, Request, ReqwestTransport, Transport};
///
/// let transport = ReqwestTransport::new();
/// let request = Request::builder(Method::Get, "https://api.example.com/users").build();
/// let response = transport.fetch(request).await?;
/// println!("{}", response.status);
/// ```
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with a rustls-backed client and a default
    /// `User-Agent`.
    ///
    /// Falls back to `reqwest`'s default client if the configured builder
    /// cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(format!("resource-client v{SDK_VERSION}"))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Creates a transport around an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn classify(error: reqwest::Error, url: &str) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Network(error)
        }
    }

    /// Parses response headers into [`Headers`].
    fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        let mut result = Headers::new();
        for (name, value) in headers {
            result.append(name.as_str(), value.to_str().unwrap_or_default());
        }
        result
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: Request) -> Result<Response, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes()).map_err(
            |_| TransportError::InvalidMethod {
                method: request.method.to_string(),
            },
        )?;

        let mut req_builder = self.client.request(method, &request.url);

        // Add query params
        if !request.query.is_empty() {
            let pairs: Vec<(&str, &str)> = request.query.iter().collect();
            req_builder = req_builder.query(&pairs);
        }

        for (name, value) in request.headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                TransportError::InvalidHeader {
                    name: name.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader {
                    name: name.to_string(),
                })?;
            req_builder = req_builder.header(header_name, header_value);
        }

        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        if !request.body.is_empty() {
            if !request.headers.contains_key("content-type") {
                if let Some(content_type) = request.body.content_type() {
                    req_builder = req_builder.header(CONTENT_TYPE, content_type);
                }
            }
            req_builder = req_builder.body(request.body.to_bytes());
        }

        let res = req_builder
            .send()
            .await
            .map_err(|e| Self::classify(e, &request.url))?;

        let status = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body = res
            .bytes()
            .await
            .map_err(|e| Self::classify(e, &request.url))?;

        Ok(Response::new(status, headers, body))
    }
}

/// Adapts an async closure into a [`Transport`].
///
/// # Example
///
/// ```rust
/// use resource_client::clients::{FnTransport, Request, Response, TransportError};
/// use serde_json::json;
///
/// let transport = FnTransport::new(|_request: Request| async {
///     Ok::<_, TransportError>(Response::json(200, &json!({"id": 1})))
/// });
/// ```
pub struct FnTransport<F> {
    handler: F,
}

impl<F> FnTransport<F> {
    /// Wraps the closure.
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnTransport")
    }
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, TransportError>> + Send,
{
    async fn fetch(&self, request: Request) -> Result<Response, TransportError> {
        (self.handler)(request).await
    }
}
