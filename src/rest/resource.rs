//! The members shared by items and collections.
//!
//! Both [`Item`] and [`Collection`] implement [`ResourceNode`]. The trait's
//! provided methods expose the route, the local and global parameter layers
//! and navigation to nested resources; implementors only hand out their
//! [`NodeCore`].
//!
//! Global getters and setters go through the shared [`Config`], so every
//! node created from the same configuration observes the change. Local
//! getters and setters only touch the node itself.
//!
//! # Example
//!
//! ```rust
//! use resource_client::{Config, ResourceClient, ResourceNode};
//!
//! let client = ResourceClient::new(Config::default());
//! let user = client.one("users", 1);
//! let posts = user.all("posts");
//!
//! assert_eq!(posts.route().to_string(), "/users/1/posts");
//! ```

use std::fmt::Display;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::clients::{Headers, QueryParams};
use crate::config::{BaseUrl, Config, IdentifierKey};
use crate::rest::collection::Collection;
use crate::rest::item::Item;
use crate::rest::params::ParamStore;
use crate::rest::path::Route;

/// State common to every resource node.
#[derive(Clone, Debug)]
pub struct NodeCore {
    pub(crate) route: Route,
    pub(crate) config: Config,
    pub(crate) params: ParamStore,
    pub(crate) metadata: Map<String, Value>,
    pub(crate) uuid: Uuid,
    pub(crate) from_server: bool,
}

impl NodeCore {
    pub(crate) fn new(config: &Config, route: Route) -> Self {
        Self {
            route,
            config: config.clone(),
            params: ParamStore::new(),
            metadata: Map::new(),
            uuid: Uuid::new_v4(),
            from_server: false,
        }
    }

    /// Copies the core with a fresh correlation id.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

/// Members shared by [`Item`] and [`Collection`].
pub trait ResourceNode {
    /// Returns the shared node state.
    fn core(&self) -> &NodeCore;

    /// Returns the shared node state mutably.
    fn core_mut(&mut self) -> &mut NodeCore;

    /// The identifier used for the last route segment when the route does
    /// not carry one.
    fn trailing_id(&self, _key: &IdentifierKey) -> Option<String> {
        None
    }

    /// Returns the configuration this node reads at request time.
    fn config(&self) -> &Config {
        &self.core().config
    }

    /// Returns the route as constructed.
    fn route(&self) -> &Route {
        &self.core().route
    }

    /// Returns the route with the last identifier resolved.
    fn resolved_route(&self) -> Route {
        let key = self.config().identifier();
        self.route().resolve(self.trailing_id(&key).as_deref())
    }

    /// Renders the absolute URL of this node.
    fn url(&self) -> String {
        let key = self.config().identifier();
        self.route()
            .render(self.config().base_url().as_ref(), self.trailing_id(&key).as_deref())
    }

    /// Returns the global base URL.
    fn base_url(&self) -> Option<BaseUrl> {
        self.config().base_url()
    }

    /// Sets the global base URL.
    fn set_base_url(&self, url: BaseUrl) {
        self.config().set_base_url(url);
    }

    /// Returns the global identifier key.
    fn identifier(&self) -> IdentifierKey {
        self.config().identifier()
    }

    /// Sets the global identifier key.
    fn set_identifier(&self, key: IdentifierKey) {
        self.config().set_identifier(key);
    }

    /// Returns the local query parameters.
    fn local_query_params(&self) -> &QueryParams {
        self.core().params.query_params()
    }

    /// Replaces the local query parameters.
    fn set_query_params(&mut self, params: impl Into<QueryParams>)
    where
        Self: Sized,
    {
        self.core_mut().params.set_query_params(params);
    }

    /// Returns the local headers.
    fn local_headers(&self) -> &Headers {
        self.core().params.headers()
    }

    /// Replaces the local headers.
    fn set_headers(&mut self, headers: impl Into<Headers>)
    where
        Self: Sized,
    {
        self.core_mut().params.set_headers(headers);
    }

    /// Returns the global query parameters.
    fn global_query_params(&self) -> QueryParams {
        self.config().query_params()
    }

    /// Replaces the global query parameters.
    fn set_global_query_params(&self, params: impl Into<QueryParams>)
    where
        Self: Sized,
    {
        self.config().set_query_params(params);
    }

    /// Returns the global headers.
    fn global_headers(&self) -> Headers {
        self.config().headers()
    }

    /// Replaces the global headers.
    fn set_global_headers(&self, headers: impl Into<Headers>)
    where
        Self: Sized,
    {
        self.config().set_headers(headers);
    }

    /// Returns the query parameters a request would carry: global
    /// overlaid with local.
    fn request_query_params(&self) -> QueryParams {
        self.core()
            .params
            .merged_query_params(&self.config().query_params())
    }

    /// Returns the headers a request would carry: global overlaid with
    /// local.
    fn request_headers(&self) -> Headers {
        self.core().params.merged_headers(&self.config().headers())
    }

    /// Navigates to a single nested resource.
    fn one(&self, name: &str, id: impl Display) -> Item
    where
        Self: Sized,
    {
        let route = self.resolved_route().join(name, Some(&id.to_string()));
        Item::at(self.config(), route)
    }

    /// Navigates to a nested collection.
    fn all(&self, name: &str) -> Collection {
        let route = self.resolved_route().join(name, None);
        Collection::at(self.config(), route)
    }

    /// Returns `true` once content was received from the server.
    fn from_server(&self) -> bool {
        self.core().from_server
    }

    /// Returns the correlation id of this node.
    fn uuid(&self) -> Uuid {
        self.core().uuid
    }

    /// Returns caller-owned metadata.
    fn metadata(&self) -> &Map<String, Value> {
        &self.core().metadata
    }

    /// Returns caller-owned metadata mutably.
    fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.core_mut().metadata
    }
}
