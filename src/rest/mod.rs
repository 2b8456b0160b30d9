//! The resource layer.
//!
//! This module turns named resources into live, mutable nodes:
//!
//! - **[`ResourceClient`]**: creates top-level nodes from a shared [`Config`](crate::Config)
//! - **[`Item`]** and **[`Collection`]**: the two node kinds, sharing [`ResourceNode`]
//! - **[`Route`]**: the chain of `(name, id)` segments a node is addressed by
//! - **[`Chain`]**: request, response and error interceptor stages
//! - **[`Body`]** and the body handlers: encoding and decoding at the transport edge
//! - **[`Pending`]**: the lazily started, cancellable pipeline every verb returns
//! - **[`Transparent`]**: key-based access merging node members and domain fields
//! - **[`ResourceError`]**: every failure a pipeline can settle with
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_client::{Config, ResourceClient, ResourceNode};
//!
//! let client = ResourceClient::new(Config::global());
//! let mut post = client.one("users", 1).one("posts", 7);
//!
//! post.get(None, None).await?; // GET /users/1/posts/7
//! post.set_field("title", "Edited");
//! post.save(None, None).await?; // PUT /users/1/posts/7
//!
//! let mut comments = post.all("comments");
//! comments.get_list(None, None).await?; // GET /users/1/posts/7/comments
//! ```

mod client;
mod codec;
mod collection;
mod errors;
mod interceptor;
mod item;
mod params;
mod path;
mod pipeline;
mod proxy;
mod resource;
mod tracking;

pub use client::{Resource, ResourceClient};
pub use codec::{
    decode_response, default_request_body_handler, default_response_body_handler, Body,
    RequestBodyHandler, ResponseBodyHandler,
};
pub use collection::{Collection, Listing};
pub use errors::{ApplicationError, ChainKind, ResourceError};
pub use interceptor::{Chain, Fault, Interceptor, Stage};
pub use item::Item;
pub use params::ParamStore;
pub use path::{Route, Segment};
pub use pipeline::Pending;
pub use proxy::{Property, Transparent};
pub use resource::{NodeCore, ResourceNode};
pub use tracking::Pristine;
