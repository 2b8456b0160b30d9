//! Transport layer: request and response descriptors and the transports
//! that exchange them.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Request`]: A fully built request, as seen by request interceptors
//! - [`Response`]: A buffered response, as seen by response interceptors
//! - [`Method`]: Supported HTTP methods
//! - [`Payload`]: A transport-ready request body
//! - [`QueryParams`] and [`Headers`]: Ordered, multi-valued parameter lists
//! - [`Transport`]: The primitive that performs a request
//! - [`ReqwestTransport`]: The default `reqwest`-backed transport
//! - [`FnTransport`]: Adapts an async closure into a transport
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_client::clients::{Method, Request, ReqwestTransport, Transport};
//!
//! let transport = ReqwestTransport::new();
//! let request = Request::builder(Method::Get, "https://api.example.com/users")
//!     .query_param("page", "1")
//!     .build();
//!
//! let response = transport.fetch(request).await?;
//! ```

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod params;

pub use errors::{BoxError, TransportError};
pub use http_client::{FnTransport, ReqwestTransport, SharedTransport, Transport, SDK_VERSION};
pub use http_request::{Method, Payload, Request, RequestBuilder};
pub use http_response::Response;
pub use params::{Headers, QueryParams};
