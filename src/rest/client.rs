//! The entry point creating top-level resource nodes.
//!
//! # Example
//!
//! ```rust
//! use resource_client::{Config, Resource, ResourceClient, ResourceNode};
//! use serde_json::json;
//!
//! let config = Config::builder()
//!     .base_url_str("https://api.example.com")
//!     .build()
//!     .unwrap();
//! let client = ResourceClient::new(config);
//!
//! let user = client.one("users", 1);
//! assert_eq!(user.url(), "https://api.example.com/users/1");
//!
//! let Resource::Collection(tags) = client.from_object("tags", json!([{"id": 1}])).unwrap() else {
//!     panic!("arrays become collections");
//! };
//! assert_eq!(tags.len(), 1);
//! ```

use std::fmt::Display;

use serde_json::Value;

use crate::config::Config;
use crate::rest::collection::Collection;
use crate::rest::errors::ResourceError;
use crate::rest::item::{kind, Item};
use crate::rest::path::Route;

/// Creates resource nodes bound to one configuration.
#[derive(Clone, Debug)]
pub struct ResourceClient {
    config: Config,
}

/// A node built from a plain JSON value.
#[derive(Clone, Debug)]
pub enum Resource {
    /// Built from an object.
    Item(Item),
    /// Built from an array.
    Collection(Collection),
}

impl Resource {
    /// Returns the item, if this is one.
    #[must_use]
    pub fn into_item(self) -> Option<Item> {
        match self {
            Self::Item(item) => Some(item),
            Self::Collection(_) => None,
        }
    }

    /// Returns the collection, if this is one.
    #[must_use]
    pub fn into_collection(self) -> Option<Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            Self::Item(_) => None,
        }
    }
}

impl ResourceClient {
    /// Creates a client over `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration shared by every node this client creates.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Addresses a single resource.
    #[must_use]
    pub fn one(&self, name: &str, id: impl Display) -> Item {
        Item::new(&self.config, name, Some(&id.to_string()))
    }

    /// Addresses a list resource.
    #[must_use]
    pub fn all(&self, name: &str) -> Collection {
        Collection::new(&self.config, name)
    }

    /// Addresses a list resource whose array responses are streamed item by
    /// item.
    #[must_use]
    pub fn all_iterable(&self, name: &str) -> Collection {
        self.all(name).iterable(true)
    }

    /// Wraps a plain object as an item, or a plain array as a collection,
    /// under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Encoding`] if `value` is neither an object nor
    /// an array of objects.
    pub fn from_object(&self, name: &str, value: Value) -> Result<Resource, ResourceError> {
        let route = Route::new().join(name, None);
        match value {
            Value::Object(element) => Ok(Resource::Item(Item::local(&self.config, route, element))),
            Value::Array(values) => {
                let elements = values
                    .into_iter()
                    .map(|value| match value {
                        Value::Object(element) => Ok(element),
                        other => Err(ResourceError::Encoding {
                            message: format!("expected an array of objects, found {}", kind(&other)),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut collection = Collection::at(&self.config, route);
                collection.set_elements(elements);
                Ok(Resource::Collection(collection))
            }
            other => Err(ResourceError::Encoding {
                message: format!("expected an object or an array, got {}", kind(&other)),
            }),
        }
    }
}

impl Default for ResourceClient {
    fn default() -> Self {
        Self::new(Config::global())
    }
}
