//! Pristine tracking for item elements.
//!
//! An [`Item`](crate::Item) remembers the element it last received from the
//! server (or was created with). Comparing against that snapshot tells
//! whether the item was edited locally and which fields changed.
//!
//! Tracking is advisory: verbs always send whatever body they are given, and
//! `save` sends the whole element.
//!
//! # Example
//!
//! ```rust
//! use resource_client::rest::Pristine;
//! use serde_json::json;
//!
//! let original = json!({"id": 1, "name": "Ada", "role": "admin"});
//! let tracker = Pristine::capture(original.as_object().unwrap());
//!
//! let edited = json!({"id": 1, "name": "Grace", "role": "admin"});
//! let edited = edited.as_object().unwrap();
//!
//! assert!(!tracker.is_pristine(edited));
//! assert_eq!(tracker.changed_fields(edited), json!({"name": "Grace"}));
//! ```

use serde_json::{Map, Value};

/// The snapshot an element is compared against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pristine {
    original: Map<String, Value>,
}

impl Pristine {
    /// Captures `element` as the pristine state.
    #[must_use]
    pub fn capture(element: &Map<String, Value>) -> Self {
        Self {
            original: element.clone(),
        }
    }

    /// Returns the captured state.
    #[must_use]
    pub const fn original(&self) -> &Map<String, Value> {
        &self.original
    }

    /// Returns `true` if `current` equals the captured state.
    #[must_use]
    pub fn is_pristine(&self, current: &Map<String, Value>) -> bool {
        &self.original == current
    }

    /// Returns the fields of `current` that differ from the captured state.
    ///
    /// Nested objects are compared recursively; removed fields are not
    /// reported.
    #[must_use]
    pub fn changed_fields(&self, current: &Map<String, Value>) -> Value {
        Value::Object(diff_objects(&self.original, current))
    }
}

fn diff_objects(original: &Map<String, Value>, current: &Map<String, Value>) -> Map<String, Value> {
    let mut diff = Map::new();
    for (key, value) in current {
        match (original.get(key), value) {
            (Some(before), after) if before == after => {}
            (Some(Value::Object(before)), Value::Object(after)) => {
                let nested = diff_objects(before, after);
                if !nested.is_empty() {
                    diff.insert(key.clone(), Value::Object(nested));
                }
            }
            _ => {
                diff.insert(key.clone(), value.clone());
            }
        }
    }
    diff
}
