//! The argument mapping that flows through a pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Ordered mapping from parameter name to value.
///
/// Keys keep their insertion order. A step never edits the mapping in place;
/// the runner merges the partial mapping a step returns via [`FilterArgs::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterArgs(Map<String, JsonValue>);

impl FilterArgs {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Get a value as a string slice, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge a step's partial mapping: new keys are appended, existing keys
    /// are overwritten in place, and keys not mentioned are kept.
    pub fn merge(&mut self, partial: FilterArgs) {
        for (key, value) in partial.0 {
            self.0.insert(key, value);
        }
    }
}

impl From<Map<String, JsonValue>> for FilterArgs {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl From<FilterArgs> for JsonValue {
    fn from(args: FilterArgs) -> Self {
        JsonValue::Object(args.0)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for FilterArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FilterArgs {
    type Item = (String, JsonValue);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
