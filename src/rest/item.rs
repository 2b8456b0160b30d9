//! A single addressable resource.
//!
//! An [`Item`] wraps one domain object (its *element*, a JSON object) and
//! the node state it is addressed by. Verbs run the request pipeline and
//! write the decoded response back onto the same item.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_client::{Config, ResourceClient, ResourceNode};
//! use serde_json::json;
//!
//! let client = ResourceClient::new(Config::global());
//! let mut user = client.one("users", 1);
//!
//! user.get(None, None).await?;
//! user.set_field("name", json!("Grace"));
//! user.save(None, None).await?; // PUT /users/1
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::clients::{Headers, Method, QueryParams};
use crate::config::{Config, IdentifierKey};
use crate::rest::codec::Body;
use crate::rest::errors::ResourceError;
use crate::rest::path::Route;
use crate::rest::pipeline::{Exchange, Pending};
use crate::rest::resource::{NodeCore, ResourceNode};
use crate::rest::tracking::Pristine;

/// A resource node wrapping one domain object.
#[derive(Clone, Debug)]
pub struct Item {
    core: NodeCore,
    element: Map<String, Value>,
    pristine: Pristine,
}

// Verify Item is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Item>();
};

impl Item {
    /// Creates an item addressed by `name` and an optional identifier.
    ///
    /// Without an identifier the item is rendered under `/name`, and under
    /// `/name/<id>` once its element carries one.
    #[must_use]
    pub fn new(config: &Config, name: &str, id: Option<&str>) -> Self {
        Self::at(config, Route::new().join(name, id))
    }

    pub(crate) fn at(config: &Config, route: Route) -> Self {
        Self::local(config, route, Map::new())
    }

    /// Creates a client-side item that has not been fetched or saved.
    pub(crate) fn local(config: &Config, route: Route, mut element: Map<String, Value>) -> Self {
        let key = config.identifier();
        if config.uuid() && route.id().is_none() && id_of(&element, &key).is_none() {
            element.insert(key.to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        Self {
            pristine: Pristine::capture(&element),
            core: NodeCore::new(config, route),
            element,
        }
    }

    /// Creates an item from an element received from the server.
    pub(crate) fn remote(config: &Config, route: Route, element: Map<String, Value>) -> Self {
        let mut core = NodeCore::new(config, route);
        core.from_server = true;
        Self {
            pristine: Pristine::capture(&element),
            core,
            element,
        }
    }

    /// Moves the item under `route`, keeping an explicit identifier.
    pub(crate) fn move_under(&mut self, route: &Route) {
        self.core.route = route.resolve(self.core.route.id());
    }

    /// Creates an item from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Encoding`] if `value` does not serialize to a
    /// JSON object.
    pub fn from_typed<T: Serialize>(
        config: &Config,
        name: &str,
        value: &T,
    ) -> Result<Self, ResourceError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(element)) => {
                Ok(Self::local(config, Route::new().join(name, None), element))
            }
            Ok(other) => Err(ResourceError::Encoding {
                message: format!("expected an object, got {}", kind(&other)),
            }),
            Err(e) => Err(ResourceError::Encoding {
                message: e.to_string(),
            }),
        }
    }

    /// Deserializes the element into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Decoding`] if the element does not match `T`.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, ResourceError> {
        serde_json::from_value(self.plain()).map_err(|e| ResourceError::decoding(e.to_string()))
    }

    /// Returns the domain element.
    #[must_use]
    pub const fn element(&self) -> &Map<String, Value> {
        &self.element
    }

    /// Returns the domain element mutably.
    pub fn element_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.element
    }

    /// Replaces the domain element.
    pub fn set_element(&mut self, element: Map<String, Value>) {
        self.element = element;
    }

    /// Returns a field of the element.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.element.get(key)
    }

    /// Sets a field of the element, returning the previous value.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.element.insert(key.into(), value.into())
    }

    /// Removes a field of the element.
    pub fn remove_field(&mut self, key: &str) -> Option<Value> {
        self.element.remove(key)
    }

    /// Returns the identifier: the route's, or the element's identifier field.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.core
            .route
            .id()
            .map(ToString::to_string)
            .or_else(|| self.trailing_id(&self.core.config.identifier()))
    }

    /// Returns the bare element as a JSON value.
    #[must_use]
    pub fn plain(&self) -> Value {
        Value::Object(self.element.clone())
    }

    /// Returns the element serialized as JSON.
    #[must_use]
    pub fn json(&self) -> String {
        self.plain().to_string()
    }

    /// Returns a deep copy with a fresh correlation id and the same route.
    #[must_use]
    pub fn clone_item(&self) -> Self {
        Self {
            core: self.core.duplicate(),
            element: self.element.clone(),
            pristine: self.pristine.clone(),
        }
    }

    /// Returns `true` if the element is unchanged since it was last received
    /// or created.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.pristine.is_pristine(&self.element)
    }

    /// Returns the fields changed since the element was last received or
    /// created.
    #[must_use]
    pub fn changed_fields(&self) -> Value {
        self.pristine.changed_fields(&self.element)
    }

    /// Sends `GET`.
    pub fn get(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Get, Body::Empty)
    }

    /// Sends `DELETE`.
    pub fn remove(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Delete, Body::Empty)
    }

    /// Sends `HEAD`.
    pub fn head(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Head, Body::Empty)
    }

    /// Sends `OPTIONS`.
    pub fn options(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Options, Body::Empty)
    }

    /// Sends `TRACE`.
    pub fn trace(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Trace, Body::Empty)
    }

    /// Sends `POST`. An empty body sends the element.
    pub fn post(
        &mut self,
        body: impl Into<Body>,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Post, body)
    }

    /// Sends `PUT`. An empty body sends the element.
    pub fn put(
        &mut self,
        body: impl Into<Body>,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Put, body)
    }

    /// Sends `PATCH`. An empty body sends the element.
    pub fn patch(
        &mut self,
        body: impl Into<Body>,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        self.request(Method::Patch, body)
    }

    /// Sends the element with `PUT` if it came from the server, `POST`
    /// otherwise.
    pub fn save(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, &mut Self> {
        self.apply(query, headers);
        let method = if self.core.from_server {
            Method::Put
        } else {
            Method::Post
        };
        self.request(method, Body::Empty)
    }

    /// Runs the pipeline for an arbitrary method.
    ///
    /// A successful object body replaces the element and marks the item as
    /// coming from the server; an empty body leaves the element unchanged.
    pub fn request(&mut self, method: Method, body: impl Into<Body>) -> Pending<'_, &mut Self> {
        let body = body.into();
        Pending::new(async move {
            let body = if body.is_empty() && sends_element(method) {
                Body::from(&*self)
            } else {
                body
            };
            let value = Exchange::prepare(&*self, method, body).run().await?;
            self.materialize(value)?;
            Ok(self)
        })
    }

    fn apply(&mut self, query: Option<QueryParams>, headers: Option<Headers>) {
        if let Some(query) = query {
            self.core.params.set_query_params(query);
        }
        if let Some(headers) = headers {
            self.core.params.set_headers(headers);
        }
    }

    fn materialize(&mut self, value: Value) -> Result<(), ResourceError> {
        match value {
            Value::Object(element) => self.element = element,
            Value::Null => {}
            other => {
                return Err(ResourceError::decoding(format!(
                    "expected an object for {}, got {}",
                    self.url(),
                    kind(&other)
                )))
            }
        }
        self.core.from_server = true;
        self.pristine = Pristine::capture(&self.element);
        Ok(())
    }
}

impl ResourceNode for Item {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn trailing_id(&self, key: &IdentifierKey) -> Option<String> {
        id_of(&self.element, key)
    }
}

const fn sends_element(method: Method) -> bool {
    matches!(method, Method::Post | Method::Put | Method::Patch)
}

fn id_of(element: &Map<String, Value>, key: &IdentifierKey) -> Option<String> {
    match element.get(key.as_ref())? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{FnTransport, Payload, Request, Response, TransportError};
    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    /// Records every request and answers with `reply`.
    fn recording(
        config: &Config,
        reply: impl Fn(&Request) -> Response + Send + Sync + 'static,
    ) -> Arc<Mutex<Vec<Request>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let reply = Arc::new(reply);
        config.set_transport(FnTransport::new(move |request: Request| {
            let response = reply(&request);
            log.lock().push(request);
            async move { Ok::<_, TransportError>(response) }
        }));
        seen
    }

    fn sent(request: &Request) -> Value {
        match &request.body {
            Payload::Json(s) => serde_json::from_str(s).unwrap(),
            _ => Value::Null,
        }
    }

    fn config() -> Config {
        Config::builder()
            .base_url_str("https://api.test")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_replaces_element_and_marks_from_server() {
        let config = config();
        let seen = recording(&config, |_| Response::json(200, &json!({"id": 1, "name": "Ada"})));
        let mut item = Item::new(&config, "users", Some("1"));
        let uuid = item.uuid();

        let item = item.get(None, None).await.unwrap();

        assert_eq!(item.field("name"), Some(&json!("Ada")));
        assert!(item.from_server());
        assert!(item.is_pristine());
        assert_eq!(item.uuid(), uuid);
        assert_eq!(seen.lock()[0].url, "https://api.test/users/1");
        assert_eq!(seen.lock()[0].method, Method::Get);
    }

    #[tokio::test]
    async fn test_save_posts_then_puts() {
        let config = config();
        let seen = recording(&config, |request| {
            let mut body = sent(request);
            body["id"] = json!(42);
            Response::json(200, &body)
        });
        let mut item = Item::local(&config, Route::new().join("users", None), Map::new());
        item.set_field("name", "Ada");

        item.save(None, None).await.unwrap();
        assert!(item.from_server());
        assert_eq!(item.id(), Some("42".to_string()));

        item.set_field("name", "Grace");
        item.save(None, None).await.unwrap();

        let seen = seen.lock();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].url, "https://api.test/users");
        assert_eq!(sent(&seen[0]), json!({"name": "Ada"}));
        assert_eq!(seen[1].method, Method::Put);
        assert_eq!(seen[1].url, "https://api.test/users/42");
        assert_eq!(sent(&seen[1]), json!({"id": 42, "name": "Grace"}));
    }

    #[tokio::test]
    async fn test_verb_arguments_replace_the_local_layer() {
        let config = config();
        config.set_query_params([("x", "1")]);
        let seen = recording(&config, |_| Response::new(204, Headers::new(), ""));
        let mut item = Item::new(&config, "users", Some("1"));

        item.remove(
            Some(QueryParams::from([("x", "2"), ("y", "3")])),
            Some(Headers::from([("X-Reason", "cleanup")])),
        )
        .await
        .unwrap();

        let seen = seen.lock();
        assert_eq!(seen[0].url, "https://api.test/users/1");
        assert_eq!(seen[0].full_url(), "https://api.test/users/1?x=2&y=3");
        assert_eq!(seen[0].headers.get("x-reason"), Some("cleanup"));
        assert_eq!(item.local_query_params().get("y"), Some("3"));
    }

    #[tokio::test]
    async fn test_empty_response_keeps_element() {
        let config = config();
        let _seen = recording(&config, |_| Response::new(204, Headers::new(), ""));
        let mut item = Item::new(&config, "users", Some("1"));
        item.set_field("name", "Ada");

        item.remove(None, None).await.unwrap();

        assert_eq!(item.plain(), json!({"name": "Ada"}));
        assert!(item.from_server());
    }

    #[tokio::test]
    async fn test_non_object_body_is_a_decoding_error() {
        let config = config();
        let _seen = recording(&config, |_| Response::json(200, &json!([1, 2])));
        let mut item = Item::new(&config, "users", Some("1"));

        let error = item.get(None, None).await.unwrap_err();

        assert!(matches!(error, ResourceError::Decoding { .. }));
        assert!(!item.from_server());
    }

    #[tokio::test]
    async fn test_explicit_body_is_sent_as_given() {
        let config = config();
        let seen = recording(&config, |_| Response::json(200, &json!({"id": 1, "age": 37})));
        let mut item = Item::new(&config, "users", Some("1"));
        item.set_field("name", "Ada");

        item.patch(json!({"age": 37}), None, None).await.unwrap();

        assert_eq!(sent(&seen.lock()[0]), json!({"age": 37}));
        assert_eq!(item.plain(), json!({"id": 1, "age": 37}));
    }

    #[test]
    fn test_clone_item_is_deep_with_a_fresh_uuid() {
        let config = config();
        let mut original = Item::new(&config, "users", Some("1"));
        original.set_field("tags", json!(["a"]));

        let mut copy = original.clone_item();
        assert_eq!(copy.plain(), original.plain());
        assert_ne!(copy.uuid(), original.uuid());
        assert_eq!(copy.url(), original.url());

        copy.element_mut()
            .get_mut("tags")
            .and_then(Value::as_array_mut)
            .unwrap()
            .push(json!("b"));

        assert_eq!(original.field("tags"), Some(&json!(["a"])));
    }

    #[test]
    fn test_identifier_is_derived_from_element() {
        let config = config();
        let mut item = Item::local(&config, Route::new().join("users", None), Map::new());
        assert_eq!(item.url(), "https://api.test/users");

        item.set_field("id", 5);
        assert_eq!(item.url(), "https://api.test/users/5");

        config.set_identifier(IdentifierKey::new("_id").unwrap());
        assert_eq!(item.url(), "https://api.test/users");
    }

    #[test]
    fn test_uuid_option_generates_identifiers() {
        let config = config();
        config.set_uuid(true);

        let generated = Item::local(&config, Route::new().join("users", None), Map::new());
        let id = generated.id().unwrap();
        assert!(Uuid::parse_str(&id).is_ok());

        let addressed = Item::new(&config, "users", Some("7"));
        assert!(addressed.field("id").is_none());
    }

    #[test]
    fn test_pristine_tracking_reports_changes() {
        let config = config();
        let mut item = Item::remote(
            &config,
            Route::new().join("users", None),
            json!({"id": 1, "name": "Ada"}).as_object().cloned().unwrap(),
        );
        assert!(item.is_pristine());

        item.set_field("name", "Grace");

        assert!(!item.is_pristine());
        assert_eq!(item.changed_fields(), json!({"name": "Grace"}));
    }

    #[test]
    fn test_typed_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct User {
            id: u64,
            name: String,
        }

        let config = config();
        let user = User {
            id: 3,
            name: "Ada".to_string(),
        };
        let item = Item::from_typed(&config, "users", &user).unwrap();

        assert_eq!(item.url(), "https://api.test/users/3");
        assert_eq!(item.to_typed::<User>().unwrap(), user);
        assert!(matches!(
            Item::from_typed(&config, "users", &vec![1, 2]),
            Err(ResourceError::Encoding { .. })
        ));
    }

    #[test]
    fn test_json_serializes_the_element() {
        let config = config();
        let mut item = Item::new(&config, "users", Some("1"));
        item.set_field("name", "Ada");
        assert_eq!(item.json(), r#"{"name":"Ada"}"#);
    }
}
