//! Block parameters: untyped host values with typed accessors.
//!
//! Hosts send parameters as plain JSON-like maps. [`Params`] keeps them in a
//! sorted map so that iteration, serialization and log output are
//! deterministic. A node's effective parameters are its block's defaults
//! overlaid with the node's own values (see [`Params::overlay`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Numeric value; integers are stored as `f64` too.
    Number(f64),
    /// Boolean flag.
    Bool(bool),
    /// Free text, e.g. a file path.
    Text(String),
}

impl ParamValue {
    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean value, if this is a flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The text, if this is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Short type name for validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Ordered parameter map of one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value lookup.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Numeric lookup; `None` if missing or not a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_number)
    }

    /// Boolean lookup; `None` if missing or not a flag.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    /// Text lookup; `None` if missing or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_text)
    }

    /// Returns a copy of `self` with every entry of `overrides` applied on top.
    #[must_use]
    pub fn overlay(&self, overrides: &Params) -> Params {
        let mut merged = self.clone();
        for (name, value) in &overrides.0 {
            merged.0.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let p = Params::new()
            .with("cutoff", 500.0)
            .with("loop", true)
            .with("path", "a.wav");
        assert_eq!(p.number("cutoff"), Some(500.0));
        assert_eq!(p.flag("loop"), Some(true));
        assert_eq!(p.text("path"), Some("a.wav"));
        assert_eq!(p.number("loop"), None);
        assert_eq!(p.number("missing"), None);
    }

    #[test]
    fn overlay_prefers_overrides() {
        let defaults = Params::new().with("order", 64).with("cutoff", 1000.0);
        let node = Params::new().with("cutoff", 500.0);
        let merged = defaults.overlay(&node);
        assert_eq!(merged.number("order"), Some(64.0));
        assert_eq!(merged.number("cutoff"), Some(500.0));
        // Inputs untouched.
        assert_eq!(defaults.number("cutoff"), Some(1000.0));
    }

    #[test]
    fn json_is_a_plain_map() {
        let p: Params =
            serde_json::from_str(r#"{"frequency": 440, "loop": false, "path": "x.wav"}"#).unwrap();
        assert_eq!(p.number("frequency"), Some(440.0));
        assert_eq!(p.flag("loop"), Some(false));
        assert_eq!(p.text("path"), Some("x.wav"));

        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["frequency"], serde_json::json!(440.0));
    }
}
