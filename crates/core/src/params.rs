//! Named parameters for features, normalizers and models
//!
//! `NamedParams` is an ordered, string-keyed container. Insertion order is
//! preserved so that serialized configs and explain descriptions are
//! deterministic. Every key passes [`NameValidator`] before it is stored.

use crate::error::{LtrError, LtrResult};
use crate::name::NameValidator;
use crate::number::format_f64;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

// ============================================================================
// ParamValue
// ============================================================================

/// A single parameter value
///
/// Feature and normalizer params are scalars. Lists and maps only show up
/// in model params (e.g. a `weights` map keyed by feature name).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    String(String),
    /// Ordered list
    List(Vec<ParamValue>),
    /// Nested params
    Map(NamedParams),
}

impl ParamValue {
    /// Convert from a JSON value. `null` is not a valid param value.
    pub fn from_json(key: &str, value: &JsonValue) -> LtrResult<Self> {
        match value {
            JsonValue::Bool(b) => Ok(ParamValue::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ParamValue::Float(f))
                } else {
                    Err(LtrError::invalid_param(key, "number out of range"))
                }
            }
            JsonValue::String(s) => Ok(ParamValue::String(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| ParamValue::from_json(key, item))
                .collect::<LtrResult<Vec<_>>>()
                .map(ParamValue::List),
            JsonValue::Object(_) => NamedParams::from_json(value).map(ParamValue::Map),
            JsonValue::Null => Err(LtrError::invalid_param(key, "null is not a valid value")),
        }
    }

    /// Convert back to JSON
    pub fn to_json(&self) -> JsonValue {
        match self {
            ParamValue::Bool(b) => JsonValue::Bool(*b),
            ParamValue::Int(i) => JsonValue::from(*i),
            ParamValue::Float(f) => JsonValue::from(*f),
            ParamValue::String(s) => JsonValue::String(s.clone()),
            ParamValue::List(items) => JsonValue::Array(items.iter().map(|v| v.to_json()).collect()),
            ParamValue::Map(params) => params.to_json(),
        }
    }

    /// Numeric view of this value: ints, floats and numeric strings
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", format_f64(*v)),
            ParamValue::String(s) => write!(f, "{}", s),
            ParamValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ParamValue::Map(params) => write!(f, "{}", params),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::Int(i) => serializer.serialize_i64(*i),
            ParamValue::Float(v) => serializer.serialize_f64(*v),
            ParamValue::String(s) => serializer.serialize_str(s),
            ParamValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ParamValue::Map(params) => params.serialize(serializer),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

// ============================================================================
// NamedParams
// ============================================================================

/// Ordered mapping from validated identifiers to param values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, ParamValue)>,
}

impl NamedParams {
    /// Create an empty param set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse params from a JSON object, validating every key
    pub fn from_json(value: &JsonValue) -> LtrResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| LtrError::shape(format!("params must be an object, got {}", value)))?;
        let mut params = NamedParams::new();
        for (key, raw) in obj {
            let parsed = ParamValue::from_json(key, raw)?;
            params.insert(key.clone(), parsed)?;
        }
        Ok(params)
    }

    /// Convert to a JSON object, in insertion order
    pub fn to_json(&self) -> JsonValue {
        let mut obj = serde_json::Map::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            obj.insert(key.clone(), value.to_json());
        }
        JsonValue::Object(obj)
    }

    /// Insert a value under a validated key
    ///
    /// Re-inserting an existing key replaces the value in place, keeping
    /// the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> LtrResult<()> {
        let key = key.into();
        NameValidator::require(&key)?;
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        Ok(())
    }

    /// Builder: insert a value, failing on an invalid key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> LtrResult<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// True if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Raw value lookup
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Float value; fails if absent, not convertible, or out of `f32` range
    pub fn get_float(&self, key: &str) -> LtrResult<f32> {
        let value = self
            .get(key)
            .ok_or_else(|| LtrError::MissingParam(key.to_string()))?;
        let wide = value
            .as_f64()
            .ok_or_else(|| LtrError::invalid_param(key, format!("cannot convert '{}' to float", value)))?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(LtrError::invalid_param(
                key,
                format!("'{}' is out of range for a 32-bit float", value),
            ));
        }
        Ok(narrow)
    }

    /// Float value, or `default` when absent or not convertible
    pub fn get_float_or(&self, key: &str, default: f32) -> f32 {
        self.get(key)
            .and_then(ParamValue::as_f64)
            .map(|v| v as f32)
            .unwrap_or(default)
    }

    /// Integer value, or `default`
    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(ParamValue::Int(i)) => *i,
            _ => default,
        }
    }

    /// Boolean value, or `default`
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(ParamValue::Bool(b)) => *b,
            _ => default,
        }
    }

    /// String value, if present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(ParamValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Nested params, if present and a map
    pub fn get_map(&self, key: &str) -> Option<&NamedParams> {
        match self.get(key) {
            Some(ParamValue::Map(m)) => Some(m),
            _ => None,
        }
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for NamedParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for NamedParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NamedParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        NamedParams::from_json(&value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
