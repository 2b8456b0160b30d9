//! Client configuration.
//!
//! This module provides the shared configuration read by every resource
//! node at request-build time.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Config`]: A cheaply clonable, shared handle to the settings
//! - [`ConfigBuilder`]: A builder for constructing [`Config`] instances
//! - [`Settings`]: A point-in-time copy of every setting, taken per request
//! - [`BaseUrl`]: A validated base URL
//! - [`IdentifierKey`]: A validated identifier field name
//!
//! Clones of a [`Config`] share state: a change made through one clone (or
//! through any node created from it) is observed by all of them. Nodes never
//! cache settings; each pipeline takes a fresh [`Config::snapshot`] when it
//! starts building its request.
//!
//! # Example
//!
//! ```rust
//! use resource_client::{BaseUrl, Config, IdentifierKey};
//!
//! let config = Config::builder()
//!     .base_url(BaseUrl::new("https://api.example.com/v1").unwrap())
//!     .identifier(IdentifierKey::new("_id").unwrap())
//!     .header("accept", "application/json")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.identifier().as_ref(), "_id");
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, IdentifierKey};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::clients::{
    BoxError, Headers, QueryParams, Request, Response, ReqwestTransport, SharedTransport,
    Transport,
};
use crate::error::ConfigError;
use crate::rest::{
    default_request_body_handler, default_response_body_handler, Chain, Fault,
    RequestBodyHandler, ResponseBodyHandler, Stage,
};

/// Invoked with the in-flight request when a pipeline is abandoned before it
/// settles.
pub type AbortCallback = Arc<dyn Fn(&Request) + Send + Sync>;

/// A point-in-time copy of every configuration value.
///
/// Interceptors, handlers and the transport are reference counted, so taking
/// a snapshot is cheap.
#[derive(Clone)]
pub struct Settings {
    /// The base URL routes are rendered against.
    pub base_url: Option<BaseUrl>,
    /// The element field holding resource ids.
    pub identifier: IdentifierKey,
    /// Whether client-constructed items get a generated identifier.
    pub uuid: bool,
    /// Headers sent with every request.
    pub headers: Headers,
    /// Query parameters sent with every request.
    pub query_params: QueryParams,
    /// Timeout applied to every request.
    pub timeout: Option<Duration>,
    /// Stages applied to outgoing requests.
    pub request_interceptors: Chain<Request>,
    /// Stages applied to successful responses.
    pub response_interceptors: Chain<Response>,
    /// Stages applied to failures.
    pub error_interceptors: Chain<Fault>,
    /// Encodes request bodies.
    pub request_body_handler: RequestBodyHandler,
    /// Decodes response bodies.
    pub response_body_handler: ResponseBodyHandler,
    /// Performs requests.
    pub transport: SharedTransport,
    /// Invoked when an in-flight pipeline is abandoned.
    pub abort_callback: Option<AbortCallback>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            identifier: IdentifierKey::default(),
            uuid: false,
            headers: Headers::new(),
            query_params: QueryParams::new(),
            timeout: None,
            request_interceptors: Chain::new(),
            response_interceptors: Chain::new(),
            error_interceptors: Chain::new(),
            request_body_handler: Arc::new(default_request_body_handler),
            response_body_handler: Arc::new(default_response_body_handler),
            transport: Arc::new(ReqwestTransport::new()),
            abort_callback: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("identifier", &self.identifier)
            .field("uuid", &self.uuid)
            .field("headers", &self.headers)
            .field("query_params", &self.query_params)
            .field("timeout", &self.timeout)
            .field("request_interceptors", &self.request_interceptors)
            .field("response_interceptors", &self.response_interceptors)
            .field("error_interceptors", &self.error_interceptors)
            .field("abort_callback", &self.abort_callback.is_some())
            .finish_non_exhaustive()
    }
}

static GLOBAL: Lazy<Config> = Lazy::new(Config::default);

/// A shared handle to the client settings.
///
/// # Thread Safety
///
/// `Config` is `Clone`, `Send`, and `Sync`. Writes take a short exclusive
/// lock; concurrent writers are last-write-wins.
///
/// # Example
///
/// ```rust
/// use resource_client::{BaseUrl, Config};
///
/// let config = Config::default();
/// let shared = config.clone();
///
/// shared.set_base_url(BaseUrl::new("https://api.example.com").unwrap());
/// assert_eq!(
///     config.base_url().map(|url| url.to_string()),
///     Some("https://api.example.com".to_string())
/// );
/// ```
#[derive(Clone, Default)]
pub struct Config {
    inner: Arc<RwLock<Settings>>,
}

// Verify Config is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Config>();
};

impl Config {
    /// Creates a new builder for constructing a `Config`.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Returns the process-wide default configuration.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Returns a copy of every current setting.
    #[must_use]
    pub fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }

    /// Applies `f` to the settings under the write lock.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.inner.write());
    }

    /// Returns `true` if both handles share the same settings.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the base URL, if configured.
    #[must_use]
    pub fn base_url(&self) -> Option<BaseUrl> {
        self.inner.read().base_url.clone()
    }

    /// Sets the base URL.
    pub fn set_base_url(&self, url: BaseUrl) {
        self.inner.write().base_url = Some(url);
    }

    /// Returns the identifier key.
    #[must_use]
    pub fn identifier(&self) -> IdentifierKey {
        self.inner.read().identifier.clone()
    }

    /// Sets the identifier key.
    pub fn set_identifier(&self, key: IdentifierKey) {
        self.inner.write().identifier = key;
    }

    /// Returns whether client-constructed items get generated identifiers.
    #[must_use]
    pub fn uuid(&self) -> bool {
        self.inner.read().uuid
    }

    /// Enables or disables generated identifiers.
    pub fn set_uuid(&self, enabled: bool) {
        self.inner.write().uuid = enabled;
    }

    /// Returns the global headers.
    #[must_use]
    pub fn headers(&self) -> Headers {
        self.inner.read().headers.clone()
    }

    /// Replaces the global headers.
    pub fn set_headers(&self, headers: impl Into<Headers>) {
        self.inner.write().headers = headers.into();
    }

    /// Returns the global query parameters.
    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        self.inner.read().query_params.clone()
    }

    /// Replaces the global query parameters.
    pub fn set_query_params(&self, params: impl Into<QueryParams>) {
        self.inner.write().query_params = params.into();
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.read().timeout
    }

    /// Sets or clears the request timeout.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.inner.write().timeout = timeout;
    }

    /// Returns the request interceptors.
    #[must_use]
    pub fn request_interceptors(&self) -> Chain<Request> {
        self.inner.read().request_interceptors.clone()
    }

    /// Replaces the request interceptors.
    pub fn set_request_interceptors(&self, chain: Chain<Request>) {
        self.inner.write().request_interceptors = chain;
    }

    /// Appends a request interceptor.
    pub fn add_request_interceptor<F>(&self, stage: F)
    where
        F: Fn(&Request) -> Result<Stage<Request>, BoxError> + Send + Sync + 'static,
    {
        self.inner.write().request_interceptors.push(stage);
    }

    /// Returns the response interceptors.
    #[must_use]
    pub fn response_interceptors(&self) -> Chain<Response> {
        self.inner.read().response_interceptors.clone()
    }

    /// Replaces the response interceptors.
    pub fn set_response_interceptors(&self, chain: Chain<Response>) {
        self.inner.write().response_interceptors = chain;
    }

    /// Appends a response interceptor.
    pub fn add_response_interceptor<F>(&self, stage: F)
    where
        F: Fn(&Response) -> Result<Stage<Response>, BoxError> + Send + Sync + 'static,
    {
        self.inner.write().response_interceptors.push(stage);
    }

    /// Returns the error interceptors.
    #[must_use]
    pub fn error_interceptors(&self) -> Chain<Fault> {
        self.inner.read().error_interceptors.clone()
    }

    /// Replaces the error interceptors.
    pub fn set_error_interceptors(&self, chain: Chain<Fault>) {
        self.inner.write().error_interceptors = chain;
    }

    /// Appends an error interceptor.
    pub fn add_error_interceptor<F>(&self, stage: F)
    where
        F: Fn(&Fault) -> Result<Stage<Fault>, BoxError> + Send + Sync + 'static,
    {
        self.inner.write().error_interceptors.push(stage);
    }

    /// Replaces the request body handler.
    pub fn set_request_body_handler(&self, handler: RequestBodyHandler) {
        self.inner.write().request_body_handler = handler;
    }

    /// Replaces the response body handler.
    pub fn set_response_body_handler(&self, handler: ResponseBodyHandler) {
        self.inner.write().response_body_handler = handler;
    }

    /// Replaces the transport.
    pub fn set_transport(&self, transport: impl Transport + 'static) {
        self.inner.write().transport = Arc::new(transport);
    }

    /// Sets the callback invoked when an in-flight pipeline is abandoned.
    pub fn set_abort_callback<F>(&self, callback: F)
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        self.inner.write().abort_callback = Some(Arc::new(callback));
    }

    /// Removes the abort callback.
    pub fn clear_abort_callback(&self) {
        self.inner.write().abort_callback = None;
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Config").field(&*self.inner.read()).finish()
    }
}

/// Builder for constructing [`Config`] instances.
///
/// # Defaults
///
/// - `base_url`: `None`
/// - `identifier`: `"id"`
/// - `uuid`: `false`
/// - headers, query parameters and interceptors: empty
/// - transport: [`ReqwestTransport`]
/// - body handlers: [`default_request_body_handler`] and
///   [`default_response_body_handler`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use resource_client::{BaseUrl, Config};
///
/// let config = Config::builder()
///     .base_url(BaseUrl::new("https://api.example.com").unwrap())
///     .query_param("api_key", "k")
///     .timeout(Duration::from_secs(10))
///     .uuid(true)
///     .build()
///     .unwrap();
///
/// assert!(config.uuid());
/// assert_eq!(config.query_params().get("api_key"), Some("k"));
/// ```
#[derive(Default)]
pub struct ConfigBuilder {
    base_url: Option<String>,
    identifier: Option<String>,
    settings: Settings,
}

impl ConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.settings.base_url = Some(url);
        self
    }

    /// Sets the base URL from a string, validated by [`build`](Self::build).
    #[must_use]
    pub fn base_url_str(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the identifier key.
    #[must_use]
    pub fn identifier(mut self, key: IdentifierKey) -> Self {
        self.settings.identifier = key;
        self
    }

    /// Sets the identifier key from a string, validated by [`build`](Self::build).
    #[must_use]
    pub fn identifier_str(mut self, key: impl Into<String>) -> Self {
        self.identifier = Some(key.into());
        self
    }

    /// Enables generated identifiers for client-constructed items.
    #[must_use]
    pub const fn uuid(mut self, enabled: bool) -> Self {
        self.settings.uuid = enabled;
        self
    }

    /// Sets all global headers.
    #[must_use]
    pub fn headers(mut self, headers: impl Into<Headers>) -> Self {
        self.settings.headers = headers.into();
        self
    }

    /// Sets a single global header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.settings.headers.set(name, value);
        self
    }

    /// Sets all global query parameters.
    #[must_use]
    pub fn query_params(mut self, params: impl Into<QueryParams>) -> Self {
        self.settings.query_params = params.into();
        self
    }

    /// Sets a single global query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.query_params.set(key, value);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    /// Appends a request interceptor.
    #[must_use]
    pub fn request_interceptor<F>(mut self, stage: F) -> Self
    where
        F: Fn(&Request) -> Result<Stage<Request>, BoxError> + Send + Sync + 'static,
    {
        self.settings.request_interceptors.push(stage);
        self
    }

    /// Appends a response interceptor.
    #[must_use]
    pub fn response_interceptor<F>(mut self, stage: F) -> Self
    where
        F: Fn(&Response) -> Result<Stage<Response>, BoxError> + Send + Sync + 'static,
    {
        self.settings.response_interceptors.push(stage);
        self
    }

    /// Appends an error interceptor.
    #[must_use]
    pub fn error_interceptor<F>(mut self, stage: F) -> Self
    where
        F: Fn(&Fault) -> Result<Stage<Fault>, BoxError> + Send + Sync + 'static,
    {
        self.settings.error_interceptors.push(stage);
        self
    }

    /// Sets the request body handler.
    #[must_use]
    pub fn request_body_handler(mut self, handler: RequestBodyHandler) -> Self {
        self.settings.request_body_handler = handler;
        self
    }

    /// Sets the response body handler.
    #[must_use]
    pub fn response_body_handler(mut self, handler: ResponseBodyHandler) -> Self {
        self.settings.response_body_handler = handler;
        self
    }

    /// Sets the transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.settings.transport = Arc::new(transport);
        self
    }

    /// Sets the callback invoked when an in-flight pipeline is abandoned.
    #[must_use]
    pub fn abort_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        self.settings.abort_callback = Some(Arc::new(callback));
        self
    }

    /// Builds the [`Config`], validating string-valued settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] or
    /// [`ConfigError::EmptyIdentifier`] if a value given as a string is
    /// invalid.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut settings = self.settings;
        if let Some(url) = self.base_url {
            settings.base_url = Some(BaseUrl::new(url)?);
        }
        if let Some(key) = self.identifier {
            settings.identifier = IdentifierKey::new(key)?;
        }
        Ok(Config {
            inner: Arc::new(RwLock::new(settings)),
        })
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("base_url", &self.base_url)
            .field("identifier", &self.identifier)
            .field("settings", &self.settings)
            .finish()
    }
}
