//! Attribute runtime values and the per-instance value bag.
//!
//! [`AttrValue`] is the closed set of value types attributes can hold at
//! runtime. [`AttributeBag`] maps attribute names to their current values and
//! is what computed getters receive as their evaluation context, so they can
//! read sibling attributes by name.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Runtime representation of an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Absent value (unset `belongs_to` slots, custom attributes without a default)
    Null,

    /// Simple boolean value
    Bool(bool),

    /// Numeric value (e.g., `coins`, `age`)
    Number(f64),

    /// Text value (e.g., `first_name`)
    Text(String),
}

impl AttrValue {
    /// Get the string slice if this is a Text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value if this is a Number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean value if this is a Bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Convert to a JSON value for sync payloads.
    pub fn to_json(&self) -> JsonValue {
        match self {
            AttrValue::Null => JsonValue::Null,
            AttrValue::Bool(b) => JsonValue::Bool(*b),
            AttrValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            AttrValue::Text(s) => JsonValue::String(s.clone()),
        }
    }

    /// Convert from a JSON scalar. Arrays and objects have no attribute
    /// representation and yield `None`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => Some(AttrValue::Null),
            JsonValue::Bool(b) => Some(AttrValue::Bool(*b)),
            JsonValue::Number(n) => n.as_f64().map(AttrValue::Number),
            JsonValue::String(s) => Some(AttrValue::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// The per-instance mapping of attribute name to current value.
///
/// Iteration order is deterministic (sorted by name). Computed getters
/// receive a `&AttributeBag` and can read siblings via [`get`](Self::get) or
/// the default-valued [`text`](Self::text) / [`number`](Self::number)
/// shorthands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeBag {
    values: BTreeMap<String, AttrValue>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, AttrValue> {
        self.values.iter()
    }

    /// Read a text attribute, falling back to `""` when absent or non-text.
    ///
    /// This is the ergonomic form for computed getters.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(AttrValue::as_text).unwrap_or("")
    }

    /// Read a numeric attribute, falling back to `0.0` when absent or non-numeric.
    pub fn number(&self, name: &str) -> f64 {
        self.get(name).and_then(AttrValue::as_number).unwrap_or(0.0)
    }

    /// Render the bag as a JSON object for sync payloads.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
