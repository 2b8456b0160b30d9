//! # Resource Client
//!
//! A resource-oriented REST client: navigate a tree of named resources, issue
//! HTTP verbs against them, and work with the live, mutable items and
//! collections the server hands back.
//!
//! ## Overview
//!
//! This crate provides:
//! - Shared, runtime-mutable configuration via [`Config`] and [`ConfigBuilder`]
//! - Route composition from nested `(name, id)` segments
//! - Two-level (global and per-node) headers and query parameters
//! - Request, response and error interceptor chains with short-circuiting stages
//! - Lazily started, cancellable pipelines ([`Pending`])
//! - [`Item`] and [`Collection`] nodes whose content is replaced in place by
//!   server responses
//! - Key-based access merging node members and domain fields ([`Transparent`])
//! - A pluggable [`Transport`], backed by `reqwest` by default
//!
//! ## Quick Start
//!
//! ```rust
//! use resource_client::{Config, ResourceClient, ResourceNode};
//!
//! let config = Config::builder()
//!     .base_url_str("https://api.example.com")
//!     .header("accept", "application/json")
//!     .build()
//!     .unwrap();
//!
//! let client = ResourceClient::new(config);
//! let comments = client.one("users", 1).one("posts", 7).all("comments");
//!
//! assert_eq!(comments.url(), "https://api.example.com/users/1/posts/7/comments");
//! ```
//!
//! ## Fetching and Saving
//!
//! Verbs return a [`Pending`] value that does nothing until awaited. A
//! successful response is written back onto the node it was issued from.
//!
//! ```rust,ignore
//! use resource_client::{ResourceClient, ResourceNode};
//!
//! let client = ResourceClient::default();
//! let mut user = client.one("users", 1);
//!
//! user.get(None, None).await?;          // GET /users/1
//! user.set_field("name", "Grace");
//! user.save(None, None).await?;         // PUT /users/1 with the element
//!
//! let mut draft = client.all("users").one("drafts", "new");
//! draft.post(serde_json::json!({"name": "Ada"}), None, None).await?;
//! ```
//!
//! ## Interceptors
//!
//! Interceptors are registered on the configuration and folded in order.
//! Each stage passes, replaces the value, or defers to a future.
//!
//! ```rust
//! use resource_client::{Config, Stage};
//!
//! let config = Config::default();
//! config.add_request_interceptor(|request| {
//!     let mut request = request.clone();
//!     request.headers.set("authorization", "Bearer token");
//!     Ok(Stage::Replace(request))
//! });
//! config.add_response_interceptor(|_| Ok(Stage::Pass));
//! ```
//!
//! An error interceptor may turn a failure into a success by returning
//! [`Fault::Resolved`] with a substitute response.
//!
//! ## Cancellation
//!
//! ```rust,ignore
//! let pending = user.get(None, None);
//! let handle = pending.abort_handle();
//! tokio::spawn(async move { handle.abort() });
//!
//! assert!(matches!(pending.await, Err(ResourceError::Cancelled)));
//! ```
//!
//! ## Design Principles
//!
//! - **Lazy by default**: nothing is sent until a pipeline is polled
//! - **Late binding**: configuration is read when a request is built, never cached
//! - **Identity preserved**: verbs mutate the node they were called on
//! - **Thread-safe**: all types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{AbortCallback, BaseUrl, Config, ConfigBuilder, IdentifierKey, Settings};
pub use error::ConfigError;

// Re-export transport types
pub use clients::{
    BoxError, FnTransport, Headers, Method, Payload, QueryParams, Request, RequestBuilder,
    ReqwestTransport, Response, SharedTransport, Transport, TransportError,
};

// Re-export resource types
pub use rest::{
    ApplicationError, Body, Chain, ChainKind, Collection, Fault, Interceptor, Item, Listing,
    Pending, Property, Resource, ResourceClient, ResourceError, ResourceNode, Stage, Transparent,
};
