//! Feature vector rendering
//!
//! CSV form (canonical, client-visible):
//!
//! ```text
//! @<model>:<score>;<feature1>:<value1>;<feature2>:<value2>
//! ```
//!
//! Features appear in `all_features` order. Names never contain `@`, `:`
//! or `;` because every name passes the identifier validator.
//!
//! JSON form: `{"@<model>": score, "<feature1>": value1, ...}`.

use ltrank_core::{format_f32, LtrError, LtrResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

const MODEL_PREFIX: char = '@';
const KEY_VALUE_SEP: char = ':';
const FEATURE_SEP: char = ';';

/// Output format of feature vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorFormat {
    /// `@model:score;name:value;...`
    #[default]
    Csv,
    /// `{"@model": score, "name": value}`
    Json,
}

impl FromStr for VectorFormat {
    type Err = LtrError;

    fn from_str(s: &str) -> LtrResult<Self> {
        match s {
            "csv" => Ok(VectorFormat::Csv),
            "json" => Ok(VectorFormat::Json),
            other => Err(LtrError::config(format!(
                "unknown vector format '{}', expected \"csv\" or \"json\"",
                other
            ))),
        }
    }
}

/// A model score plus every reported feature value
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    model: String,
    score: f32,
    values: Vec<(String, f32)>,
}

impl FeatureVector {
    /// Create a vector
    pub fn new(model: impl Into<String>, score: f32, values: Vec<(String, f32)>) -> Self {
        FeatureVector {
            model: model.into(),
            score,
            values,
        }
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Final score
    pub fn score(&self) -> f32 {
        self.score
    }

    /// `(name, value)` pairs in report order
    pub fn values(&self) -> &[(String, f32)] {
        &self.values
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Canonical `@model:score;name:value` rendering
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(16 + self.values.len() * 16);
        out.push(MODEL_PREFIX);
        out.push_str(&self.model);
        out.push(KEY_VALUE_SEP);
        out.push_str(&format_f32(self.score));
        for (name, value) in &self.values {
            out.push(FEATURE_SEP);
            out.push_str(name);
            out.push(KEY_VALUE_SEP);
            out.push_str(&format_f32(*value));
        }
        out
    }

    /// JSON map rendering, in report order
    pub fn to_json(&self) -> JsonValue {
        let mut obj = Map::with_capacity(self.values.len() + 1);
        obj.insert(format!("{}{}", MODEL_PREFIX, self.model), json_number(self.score));
        for (name, value) in &self.values {
            obj.insert(name.clone(), json_number(*value));
        }
        JsonValue::Object(obj)
    }

    /// Render in the requested format
    pub fn render(&self, format: VectorFormat) -> String {
        match format {
            VectorFormat::Csv => self.to_csv(),
            VectorFormat::Json => self.to_json().to_string(),
        }
    }

    /// Parse the canonical CSV form
    pub fn parse(text: &str) -> LtrResult<Self> {
        let body = text
            .strip_prefix(MODEL_PREFIX)
            .ok_or_else(|| malformed(text, "missing '@' model prefix"))?;
        let mut parts = body.split(FEATURE_SEP);
        let (model, score) = parse_pair(text, parts.next().unwrap_or_default())?;
        let values = parts
            .map(|part| parse_pair(text, part).map(|(n, v)| (n.to_string(), v)))
            .collect::<LtrResult<Vec<_>>>()?;
        Ok(FeatureVector::new(model, score, values))
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv())
    }
}

impl FromStr for FeatureVector {
    type Err = LtrError;

    fn from_str(s: &str) -> LtrResult<Self> {
        FeatureVector::parse(s)
    }
}

fn parse_pair<'t>(text: &str, part: &'t str) -> LtrResult<(&'t str, f32)> {
    let (name, value) = part
        .split_once(KEY_VALUE_SEP)
        .ok_or_else(|| malformed(text, &format!("'{}' is not name:value", part)))?;
    if name.is_empty() {
        return Err(malformed(text, "empty name"));
    }
    let value = value
        .parse::<f32>()
        .map_err(|_| malformed(text, &format!("'{}' is not a number", value)))?;
    Ok((name, value))
}

fn malformed(text: &str, reason: &str) -> LtrError {
    LtrError::shape(format!("malformed feature vector '{}': {}", text, reason))
}

fn json_number(value: f32) -> JsonValue {
    // Through the decimal rendering so 0.1f32 stays 0.1 rather than 0.10000000149
    format_f32(value)
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or(JsonValue::Null, JsonValue::Number)
}
