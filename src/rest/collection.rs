//! A list resource.
//!
//! A [`Collection`] holds an ordered sequence of [`Item`]s addressed under
//! one route. Verbs resolve to a [`Listing`], whose variant depends on the
//! decoded body and on whether the collection is in iterable mode.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_client::{Config, Listing, ResourceClient};
//!
//! let client = ResourceClient::new(Config::global());
//! let mut users = client.all("users");
//!
//! users.get_list(None, None).await?;
//! for user in &users {
//!     println!("{}", user.json());
//! }
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde_json::{Map, Value};

use crate::clients::{Headers, Method, QueryParams};
use crate::config::Config;
use crate::rest::codec::Body;
use crate::rest::errors::ResourceError;
use crate::rest::item::{kind, Item};
use crate::rest::path::Route;
use crate::rest::pipeline::{Exchange, Pending};
use crate::rest::resource::{NodeCore, ResourceNode};

/// A resource node wrapping an ordered sequence of items.
#[derive(Clone, Debug)]
pub struct Collection {
    core: NodeCore,
    elements: Vec<Item>,
    iterable: bool,
}

/// The outcome of a collection verb.
pub enum Listing<'a> {
    /// The collection itself: its elements were replaced by an array body, or
    /// left unchanged by an empty body.
    Collection(&'a mut Collection),
    /// An array body in iterable mode, one item at a time. The collection
    /// is not modified.
    Items(BoxStream<'static, Item>),
    /// An object body, such as the element created by a `POST`.
    Item(Item),
}

impl<'a> Listing<'a> {
    /// Returns the collection, if that is what the verb resolved to.
    #[must_use]
    pub fn into_collection(self) -> Option<&'a mut Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Returns the item stream of an iterable-mode response.
    #[must_use]
    pub fn into_items(self) -> Option<BoxStream<'static, Item>> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the single item of an object response.
    #[must_use]
    pub fn into_item(self) -> Option<Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }
}

impl fmt::Debug for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(collection) => f.debug_tuple("Collection").field(collection).finish(),
            Self::Items(_) => f.write_str("Items(..)"),
            Self::Item(item) => f.debug_tuple("Item").field(item).finish(),
        }
    }
}

impl Collection {
    /// Creates a collection addressed by `name`.
    #[must_use]
    pub fn new(config: &Config, name: &str) -> Self {
        Self::at(config, Route::new().join(name, None))
    }

    pub(crate) fn at(config: &Config, route: Route) -> Self {
        Self {
            core: NodeCore::new(config, route),
            elements: Vec::new(),
            iterable: false,
        }
    }

    /// Switches iterable mode: array bodies are emitted as a stream of items
    /// instead of replacing the elements.
    #[must_use]
    pub fn iterable(mut self, enabled: bool) -> Self {
        self.iterable = enabled;
        self
    }

    /// Returns `true` in iterable mode.
    #[must_use]
    pub const fn is_iterable(&self) -> bool {
        self.iterable
    }

    /// Sets iterable mode.
    pub fn set_iterable(&mut self, enabled: bool) {
        self.iterable = enabled;
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over the items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.elements.iter()
    }

    /// Iterates mutably over the items in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Item> {
        self.elements.iter_mut()
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Item> {
        self.elements.get(index)
    }

    /// Returns the item at `index` mutably.
    pub fn element_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.elements.get_mut(index)
    }

    /// Returns every item.
    #[must_use]
    pub fn elements(&self) -> &[Item] {
        &self.elements
    }

    /// Replaces every item with client-side items built from `elements`.
    pub fn set_elements(&mut self, elements: impl IntoIterator<Item = Map<String, Value>>) {
        self.elements = elements
            .into_iter()
            .map(|element| Item::local(&self.core.config, self.core.route.clone(), element))
            .collect();
    }

    /// Appends an item, moving it under this collection's route. An explicit
    /// identifier on the item's own route is kept.
    pub fn push(&mut self, mut item: Item) {
        item.move_under(&self.core.route);
        self.elements.push(item);
    }

    /// Appends a client-side item built from `element` and returns it.
    pub fn push_element(&mut self, element: Map<String, Value>) -> &mut Item {
        let item = Item::local(&self.core.config, self.core.route.clone(), element);
        self.elements.push(item);
        let last = self.elements.len() - 1;
        &mut self.elements[last]
    }

    /// Removes and returns the item at `index`.
    pub fn take(&mut self, index: usize) -> Option<Item> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    /// Shortens the collection to `len` items.
    pub fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
    }

    /// Returns the bare elements as a JSON array.
    #[must_use]
    pub fn plain(&self) -> Value {
        Value::Array(self.elements.iter().map(Item::plain).collect())
    }

    /// Returns the elements serialized as a JSON array.
    #[must_use]
    pub fn json(&self) -> String {
        self.plain().to_string()
    }

    /// Returns a deep copy with fresh correlation ids and the same route.
    #[must_use]
    pub fn clone_collection(&self) -> Self {
        Self {
            core: self.core.duplicate(),
            elements: self.elements.iter().map(Item::clone_item).collect(),
            iterable: self.iterable,
        }
    }

    /// Sends `GET`.
    pub fn get(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Get, Body::Empty)
    }

    /// Sends `GET` to refresh the whole list in place.
    pub fn get_list(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.get(query, headers)
    }

    /// Sends `DELETE`.
    pub fn remove(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Delete, Body::Empty)
    }

    /// Sends `HEAD`.
    pub fn head(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Head, Body::Empty)
    }

    /// Sends `OPTIONS`.
    pub fn options(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Options, Body::Empty)
    }

    /// Sends `TRACE`.
    pub fn trace(
        &mut self,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Trace, Body::Empty)
    }

    /// Sends `POST`.
    pub fn post(
        &mut self,
        body: impl Into<Body>,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Post, body)
    }

    /// Sends `PUT`.
    pub fn put(
        &mut self,
        body: impl Into<Body>,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Put, body)
    }

    /// Sends `PATCH`.
    pub fn patch(
        &mut self,
        body: impl Into<Body>,
        query: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Pending<'_, Listing<'_>> {
        self.apply(query, headers);
        self.request(Method::Patch, body)
    }

    /// Runs the pipeline for an arbitrary method.
    pub fn request(&mut self, method: Method, body: impl Into<Body>) -> Pending<'_, Listing<'_>> {
        let body = body.into();
        Pending::new(async move {
            let value = Exchange::prepare(&*self, method, body).run().await?;
            materialize(self, value)
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

    fn remote_item(&self, value: Value) -> Result<Item, ResourceError> {
        match value {
            Value::Object(element) => Ok(Item::remote(
                &self.core.config,
                self.core.route.clone(),
                element,
            )),
            other => Err(ResourceError::decoding(format!(
                "expected an object in the list at {}, got {}",
                self.url(),
                kind(&other)
            ))),
        }
    }
}

fn materialize(collection: &mut Collection, value: Value) -> Result<Listing<'_>, ResourceError> {
    match value {
        Value::Array(values) => {
            let items = values
                .into_iter()
                .map(|value| collection.remote_item(value))
                .collect::<Result<Vec<_>, _>>()?;
            if collection.iterable {
                return Ok(Listing::Items(stream::iter(items).boxed()));
            }
            collection.elements = items;
            collection.core.from_server = true;
            Ok(Listing::Collection(collection))
        }
        Value::Object(_) => collection.remote_item(value).map(Listing::Item),
        Value::Null => {
            collection.core.from_server = true;
            Ok(Listing::Collection(collection))
        }
        other => Err(ResourceError::decoding(format!(
            "expected an array for {}, got {}",
            collection.url(),
            kind(&other)
        ))),
    }
}

impl ResourceNode for Collection {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
}

impl Index<usize> for Collection {
    type Output = Item;

    fn index(&self, index: usize) -> &Item {
        &self.elements[index]
    }
}

impl IndexMut<usize> for Collection {
    fn index_mut(&mut self, index: usize) -> &mut Item {
        &mut self.elements[index]
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<'a> IntoIterator for &'a mut Collection {
    type Item = &'a mut Item;
    type IntoIter = std::slice::IterMut<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{FnTransport, Request, Response, TransportError};
    use serde_json::json;

    fn config_answering(body: Value) -> Config {
        let config = Config::builder()
            .base_url_str("https://api.test")
            .build()
            .unwrap();
        config.set_transport(FnTransport::new(move |_: Request| {
            let body = body.clone();
            async move { Ok::<_, TransportError>(Response::json(200, &body)) }
        }));
        config
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_array_body_replaces_elements() {
        let config = config_answering(json!([{"id": 1}, {"id": 2}]));
        let mut users = Collection::new(&config, "users");

        let listing = users.get_list(None, None).await.unwrap();
        let users = listing.into_collection().unwrap();

        assert_eq!(users.len(), 2);
        assert!(users.from_server());
        assert!(users[0].from_server());
        assert_eq!(users[1].url(), "https://api.test/users/2");
        assert_eq!(users.plain(), json!([{"id": 1}, {"id": 2}]));
    }

    #[tokio::test]
    async fn test_iterable_mode_streams_items_without_touching_the_collection() {
        let config = config_answering(json!([{"id": 1}, {"id": 2}, {"id": 3}]));
        let mut users = Collection::new(&config, "users").iterable(true);

        let items = users.get(None, None).await.unwrap().into_items().unwrap();
        let ids: Vec<_> = items.map(|item| item.id()).collect().await;

        assert_eq!(
            ids,
            vec![Some("1".to_string()), Some("2".to_string()), Some("3".to_string())]
        );
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_object_body_resolves_to_an_item() {
        let config = config_answering(json!({"id": 9, "name": "new"}));
        let mut users = Collection::new(&config, "users");

        let created = users
            .post(json!({"name": "new"}), None, None)
            .await
            .unwrap()
            .into_item()
            .unwrap();

        assert_eq!(created.url(), "https://api.test/users/9");
        assert!(created.from_server());
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_array_of_scalars_is_a_decoding_error() {
        let config = config_answering(json!([1, 2]));
        let mut users = Collection::new(&config, "users");

        let result = users.get(None, None).await;

        assert!(matches!(result, Err(ResourceError::Decoding { .. })));
    }

    #[test]
    fn test_iteration_is_restartable() {
        let config = Config::default();
        let mut users = Collection::new(&config, "users");
        users.set_elements([object(json!({"id": 1})), object(json!({"id": 2}))]);

        let first: Vec<_> = users.iter().map(|item| item.uuid()).collect();
        let second: Vec<_> = (&users).into_iter().map(|item| item.uuid()).collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_indexed_access_is_not_clamped() {
        let config = Config::default();
        let mut users = Collection::new(&config, "users");
        users.push_element(object(json!({"id": 1})));

        assert!(users.element(0).is_some());
        assert!(users.element(1).is_none());
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_indexing_past_the_end_panics() {
        let config = Config::default();
        let users = Collection::new(&config, "users");
        let _ = users[0].plain();
    }

    #[test]
    fn test_length_tracks_mutations() {
        let config = Config::default();
        let mut users = Collection::new(&config, "users");
        users.set_elements([object(json!({"id": 1})), object(json!({"id": 2}))]);
        users.push(Item::new(&config, "users", Some("3")));
        assert_eq!(users.len(), 3);

        let taken = users.take(0).unwrap();
        assert_eq!(taken.id(), Some("1".to_string()));
        assert!(users.take(5).is_none());

        users.truncate(1);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id(), Some("2".to_string()));
    }

    #[test]
    fn test_pushed_items_are_moved_under_the_collection() {
        let config = Config::builder()
            .base_url_str("https://api.test")
            .build()
            .unwrap();
        let route = Route::new().join("users", Some("1")).join("posts", None);
        let mut posts = Collection::at(&config, route);

        posts.push(Item::new(&config, "articles", Some("3")));
        let mut draft = Item::new(&config, "drafts", None);
        draft.set_field("id", 4);
        posts.push(draft);

        assert_eq!(posts[0].url(), "https://api.test/users/1/posts/3");
        assert_eq!(posts[1].url(), "https://api.test/users/1/posts/4");
    }

    #[test]
    fn test_clone_collection_is_deep() {
        let config = Config::default();
        let mut users = Collection::new(&config, "users");
        users.set_elements([object(json!({"id": 1, "name": "a"}))]);

        let mut copy = users.clone_collection();
        copy[0].set_field("name", "b");

        assert_eq!(users[0].field("name"), Some(&json!("a")));
        assert_eq!(copy.plain(), json!([{"id": 1, "name": "b"}]));
        assert_ne!(copy.uuid(), users.uuid());
        assert_ne!(copy[0].uuid(), users[0].uuid());
    }
}
