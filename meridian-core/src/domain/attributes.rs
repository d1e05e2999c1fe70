//! Attribute maps carried by endpoints.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

/// Insertion-ordered string map. The wire order is preserved for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl Attributes {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set `key`, keeping its original position when it already exists.
    /// Returns the replaced value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove `key`, returning its value. Later entries keep their relative order.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A derived attribute value. Never written back to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicValue {
    /// Integer value, e.g. epoch millis or a weight.
    Int(i64),
    /// Free-form text.
    Text(String),
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Int(value) => write!(f, "{value}"),
            DynamicValue::Text(value) => f.write_str(value),
        }
    }
}

/// Derived attributes recomputed whenever an endpoint is rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicAttributes {
    values: BTreeMap<String, DynamicValue>,
}

impl DynamicAttributes {
    /// Value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.values.get(key)
    }

    /// Integer value stored for `key`, `None` when absent or textual.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(DynamicValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Set `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: DynamicValue) {
        self.values.insert(key.into(), value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
