//! Key-based access across node members and domain data.
//!
//! [`Transparent`] lets a caller address an [`Item`] or a [`Collection`] by
//! string keys, as if the node and its wrapped data were one value. Reserved
//! member names are resolved first; every other key goes to the domain data:
//! the element of an item, or the sequence of a collection (numeric keys).
//!
//! | key | read | write |
//! |-----|------|-------|
//! | `baseURL` | global base URL | global setter |
//! | `identifier` | global identifier key | global setter |
//! | `headers`, `queryParams` | global layer | global setter |
//! | `localHeaders`, `localQueryParams` | local layer | local setter |
//! | `requestHeaders`, `requestQueryParams` | merged view | read-only |
//! | `URL`, `route`, `uuid`, `fromServer` | node state | read-only |
//! | `metadata` | caller-owned metadata | replaces it |
//! | `$element` (item) | the element | replaces it |
//! | `pristine` (item) | unchanged since last received | read-only |
//! | `$elements`, `length` (collection) | the sequence, its length | replace, truncate |
//!
//! # Example
//!
//! ```rust
//! use resource_client::{Config, Item, Transparent};
//! use serde_json::json;
//!
//! let config = Config::default();
//! let mut user = Item::new(&config, "users", Some("1"));
//!
//! user.set_property("name", json!("Ada")).unwrap();
//! assert_eq!(user.property("name").unwrap().to_value(), json!("Ada"));
//!
//! // Reserved names address the node, not the element.
//! user.set_property("localHeaders", json!({"x-trace": "on"})).unwrap();
//! assert_eq!(user.element().len(), 1);
//! ```

use serde_json::{Map, Value};

use crate::clients::{Headers, QueryParams};
use crate::config::{BaseUrl, IdentifierKey};
use crate::rest::collection::Collection;
use crate::rest::errors::ResourceError;
use crate::rest::item::{kind, Item};
use crate::rest::resource::ResourceNode;

/// The value found under a key.
#[derive(Clone, Debug)]
pub enum Property<'a> {
    /// A node member, computed on access.
    Member(Value),
    /// A field of an item's element.
    Field(&'a Value),
    /// An item of a collection.
    Element(&'a Item),
}

impl Property<'_> {
    /// Returns the property as a plain JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Member(value) => value.clone(),
            Self::Field(value) => (*value).clone(),
            Self::Element(item) => item.plain(),
        }
    }
}

/// Key-based access to a node and its domain data.
pub trait Transparent: ResourceNode {
    /// Reads the member or domain value under `key`.
    fn property(&self, key: &str) -> Option<Property<'_>>;

    /// Writes through a member setter, or into the domain data.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Member`] for read-only members and values of
    /// the wrong shape, and [`ResourceError::Config`] for invalid base URLs or
    /// identifier keys.
    fn set_property(&mut self, key: &str, value: Value) -> Result<(), ResourceError>;

    /// Removes `key` from the domain data. Node members are never removed.
    fn delete_property(&mut self, key: &str) -> Option<Value>;
}

impl Transparent for Item {
    fn property(&self, key: &str) -> Option<Property<'_>> {
        match key {
            "$element" => Some(Property::Member(self.plain())),
            "pristine" => Some(Property::Member(Value::Bool(self.is_pristine()))),
            _ => node_member(self, key)
                .map(Property::Member)
                .or_else(|| self.field(key).map(Property::Field)),
        }
    }

    fn set_property(&mut self, key: &str, value: Value) -> Result<(), ResourceError> {
        match key {
            "$element" => {
                self.set_element(expect_object(key, value)?);
                Ok(())
            }
            "pristine" => Err(read_only(key)),
            _ if is_node_member(key) => set_node_member(self, key, value),
            _ => {
                self.set_field(key, value);
                Ok(())
            }
        }
    }

    fn delete_property(&mut self, key: &str) -> Option<Value> {
        if key == "$element" || key == "pristine" || is_node_member(key) {
            return None;
        }
        self.remove_field(key)
    }
}

impl Transparent for Collection {
    fn property(&self, key: &str) -> Option<Property<'_>> {
        match key {
            "$elements" => Some(Property::Member(self.plain())),
            "length" => Some(Property::Member(Value::from(self.len()))),
            _ => node_member(self, key).map(Property::Member).or_else(|| {
                key.parse::<usize>()
                    .ok()
                    .and_then(|index| self.element(index))
                    .map(Property::Element)
            }),
        }
    }

    fn set_property(&mut self, key: &str, value: Value) -> Result<(), ResourceError> {
        match key {
            "$elements" => {
                let values = match value {
                    Value::Array(values) => values,
                    other => return Err(wrong_shape(key, "an array", &other)),
                };
                let elements = values
                    .into_iter()
                    .map(|value| expect_object(key, value))
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_elements(elements);
                Ok(())
            }
            "length" => {
                let len = value
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| wrong_shape(key, "a non-negative integer", &value))?;
                if len > self.len() {
                    return Err(ResourceError::Member {
                        name: key.to_string(),
                        reason: format!("cannot grow a collection of {} items to {len}", self.len()),
                    });
                }
                self.truncate(len);
                Ok(())
            }
            _ if is_node_member(key) => set_node_member(self, key, value),
            _ => {
                let index = key.parse::<usize>().map_err(|_| ResourceError::Member {
                    name: key.to_string(),
                    reason: "collections only accept numeric keys".to_string(),
                })?;
                let element = expect_object(key, value)?;
                match index.cmp(&self.len()) {
                    std::cmp::Ordering::Less => self[index].set_element(element),
                    std::cmp::Ordering::Equal => {
                        self.push_element(element);
                    }
                    std::cmp::Ordering::Greater => {
                        return Err(ResourceError::Member {
                            name: key.to_string(),
                            reason: format!("index past the end of {} items", self.len()),
                        })
                    }
                }
                Ok(())
            }
        }
    }

    fn delete_property(&mut self, key: &str) -> Option<Value> {
        let index = key.parse::<usize>().ok()?;
        self.take(index).map(|item| item.plain())
    }
}

const NODE_MEMBERS: &[&str] = &[
    "baseURL",
    "URL",
    "identifier",
    "headers",
    "queryParams",
    "localHeaders",
    "localQueryParams",
    "requestHeaders",
    "requestQueryParams",
    "fromServer",
    "uuid",
    "metadata",
    "route",
];

fn is_node_member(key: &str) -> bool {
    NODE_MEMBERS.contains(&key)
}

fn node_member<N: ResourceNode + ?Sized>(node: &N, key: &str) -> Option<Value> {
    let value = match key {
        "baseURL" => node
            .base_url()
            .map_or(Value::Null, |url| Value::String(url.to_string())),
        "URL" => Value::String(node.url()),
        "identifier" => Value::String(node.identifier().to_string()),
        "headers" => node.global_headers().to_json(),
        "queryParams" => node.global_query_params().to_json(),
        "localHeaders" => node.local_headers().to_json(),
        "localQueryParams" => node.local_query_params().to_json(),
        "requestHeaders" => node.request_headers().to_json(),
        "requestQueryParams" => node.request_query_params().to_json(),
        "fromServer" => Value::Bool(node.from_server()),
        "uuid" => Value::String(node.uuid().to_string()),
        "metadata" => Value::Object(node.metadata().clone()),
        "route" => Value::String(node.route().to_string()),
        _ => return None,
    };
    Some(value)
}

fn set_node_member<N: ResourceNode>(
    node: &mut N,
    key: &str,
    value: Value,
) -> Result<(), ResourceError> {
    match key {
        "baseURL" => {
            let url = expect_string(key, value)?;
            node.set_base_url(BaseUrl::new(url)?);
        }
        "identifier" => {
            let name = expect_string(key, value)?;
            node.set_identifier(IdentifierKey::new(name)?);
        }
        "headers" => node.set_global_headers(&expect_object(key, value)?),
        "queryParams" => node.set_global_query_params(&expect_object(key, value)?),
        "localHeaders" => {
            let headers = Headers::from(&expect_object(key, value)?);
            node.set_headers(headers);
        }
        "localQueryParams" => {
            let params = QueryParams::from(&expect_object(key, value)?);
            node.set_query_params(params);
        }
        "metadata" => *node.metadata_mut() = expect_object(key, value)?,
        _ => return Err(read_only(key)),
    }
    Ok(())
}

fn expect_object(key: &str, value: Value) -> Result<Map<String, Value>, ResourceError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(wrong_shape(key, "an object", &other)),
    }
}

fn expect_string(key: &str, value: Value) -> Result<String, ResourceError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(wrong_shape(key, "a string", &other)),
    }
}

fn wrong_shape(key: &str, expected: &str, value: &Value) -> ResourceError {
    ResourceError::Member {
        name: key.to_string(),
        reason: format!("expected {expected}, got {}", kind(value)),
    }
}

fn read_only(key: &str) -> ResourceError {
    ResourceError::Member {
        name: key.to_string(),
        reason: "member is read-only".to_string(),
    }
}
