//! Query parameter and header collections.
//!
//! Both collections keep insertion order and allow repeated keys, mirroring
//! how query strings and header blocks appear on the wire. Header names are
//! case-insensitive and are stored lowercased.
//!
//! # Example
//!
//! ```rust
//! use resource_client::{Headers, QueryParams};
//!
//! let params = QueryParams::from([("page", "2"), ("tag", "a b")]);
//! assert_eq!(params.to_query_string(), "page=2&tag=a%20b");
//!
//! let headers = Headers::from([("Accept", "application/json")]);
//! assert_eq!(headers.get("accept"), Some("application/json"));
//! ```

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Pairs(Vec<(String, String)>);

impl Pairs {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn set(&mut self, key: String, value: String) {
        match self.0.iter().position(|(k, _)| *k == key) {
            Some(index) => {
                self.0[index].1 = value;
                let mut seen = false;
                self.0.retain(|(k, _)| {
                    if *k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.0.push((key, value)),
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|(k, _)| k != key);
        before != self.0.len()
    }

    /// Returns `self` with every key present in `local` replaced by the local values.
    fn overlay(&self, local: &Self) -> Self {
        let mut merged: Vec<(String, String)> = self
            .0
            .iter()
            .filter(|(k, _)| !local.0.iter().any(|(lk, _)| lk == k))
            .cloned()
            .collect();
        merged.extend(local.0.iter().cloned());
        Self(merged)
    }

    fn from_json(map: &Map<String, Value>, normalize: fn(&str) -> String) -> Self {
        let mut pairs = Vec::new();
        for (key, value) in map {
            let key = normalize(key);
            match value {
                Value::Null => {}
                Value::Array(values) => {
                    for v in values {
                        if let Some(v) = scalar_to_string(v) {
                            pairs.push((key.clone(), v));
                        }
                    }
                }
                other => {
                    if let Some(v) = scalar_to_string(other) {
                        pairs.push((key, v));
                    }
                }
            }
        }
        Self(pairs)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Some(value.to_string())
        }
    }
}

fn identity(key: &str) -> String {
    key.to_string()
}

fn lowercase(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Ordered, multi-valued query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Pairs,
}

impl QueryParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from a plain JSON object.
    ///
    /// Scalars are stringified, arrays become repeated keys and `null`
    /// values are skipped.
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Self {
        Self {
            pairs: Pairs::from_json(map, identity),
        }
    }

    /// Appends a value, keeping any existing values for the key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.0.push((key.into(), value.into()));
    }

    /// Sets a key to a single value, replacing existing values.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.set(key.into(), value.into());
    }

    /// Returns the first value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key)
    }

    /// Returns every value for a key, in insertion order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs.get_all(key)
    }

    /// Removes every value for a key. Returns `true` if anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.pairs.remove(key)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.get(key).is_some()
    }

    /// Returns the number of key/value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.0.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.0.is_empty()
    }

    /// Iterates over key/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges `local` over `self`: keys present in `local` win entirely.
    #[must_use]
    pub fn overlay(&self, local: &Self) -> Self {
        Self {
            pairs: self.pairs.overlay(&local.pairs),
        }
    }

    /// Renders the parameters as a percent-encoded query string (without `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Renders the parameters as a JSON object; repeated keys become arrays.
    #[must_use]
    pub fn to_json(&self) -> Value {
        pairs_to_json(&self.pairs)
    }
}

/// Ordered header collection with case-insensitive names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    pairs: Pairs,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds headers from a plain JSON object.
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Self {
        Self {
            pairs: Pairs::from_json(map, lowercase),
        }
    }

    /// Appends a header value, keeping existing values.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.pairs.0.push((lowercase(name.as_ref()), value.into()));
    }

    /// Sets a header to a single value, replacing existing values.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.pairs.set(lowercase(name.as_ref()), value.into());
    }

    /// Returns the first value for a header name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.get(&lowercase(name))
    }

    /// Returns every value for a header name.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs.get_all(&lowercase(name))
    }

    /// Removes a header. Returns `true` if anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.pairs.remove(&lowercase(name))
    }

    /// Returns `true` if the header is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of header entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.0.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.0.is_empty()
    }

    /// Iterates over header entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges `local` over `self`: names present in `local` win entirely.
    #[must_use]
    pub fn overlay(&self, local: &Self) -> Self {
        Self {
            pairs: self.pairs.overlay(&local.pairs),
        }
    }

    /// Renders the headers as a JSON object; repeated names become arrays.
    #[must_use]
    pub fn to_json(&self) -> Value {
        pairs_to_json(&self.pairs)
    }
}

fn pairs_to_json(pairs: &Pairs) -> Value {
    let mut map = Map::new();
    for (key, value) in &pairs.0 {
        match map.get_mut(key) {
            Some(Value::Array(values)) => values.push(Value::String(value.clone())),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value.clone())]);
            }
            None => {
                map.insert(key.clone(), Value::String(value.clone()));
            }
        }
    }
    Value::Object(map)
}

macro_rules! impl_conversions {
    ($ty:ident, $normalize:path) => {
        impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for $ty {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self {
                    pairs: Pairs(
                        iter.into_iter()
                            .map(|(k, v)| ($normalize(k.as_ref()), v.into()))
                            .collect(),
                    ),
                }
            }
        }

        impl<K: AsRef<str>, V: Into<String>, const N: usize> From<[(K, V); N]> for $ty {
            fn from(pairs: [(K, V); N]) -> Self {
                pairs.into_iter().collect()
            }
        }

        impl<K: AsRef<str>, V: Into<String>> From<Vec<(K, V)>> for $ty {
            fn from(pairs: Vec<(K, V)>) -> Self {
                pairs.into_iter().collect()
            }
        }

        impl<S: std::hash::BuildHasher> From<HashMap<String, String, S>> for $ty {
            fn from(map: HashMap<String, String, S>) -> Self {
                map.into_iter().collect()
            }
        }

        impl From<BTreeMap<String, String>> for $ty {
            fn from(map: BTreeMap<String, String>) -> Self {
                map.into_iter().collect()
            }
        }

        impl From<&Map<String, Value>> for $ty {
            fn from(map: &Map<String, Value>) -> Self {
                Self::from_json(map)
            }
        }
    };
}

impl_conversions!(QueryParams, identity);
impl_conversions!(Headers, lowercase);
