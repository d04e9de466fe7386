//! Shipped feature kinds
//!
//! | type id         | params                       |
//! |-----------------|------------------------------|
//! | `Value`         | `value`, `required`?         |
//! | `FieldValue`    | `field`                      |
//! | `OriginalScore` | none                         |
//! | `HasField`      | `field`                      |
//! | `FieldLength`   | `field`                      |
//! | `FieldCharLength` | `field`                    |

use crate::context::{DocContext, FieldValue};
use crate::feature::{FeatureRegistry, FeatureScorer};
use crate::macros;
use ltrank_core::{format_f32, format_f64, LtrError, LtrResult, NamedParams, ParamValue};

/// Type identifier of [`ValueFeature`]
pub const VALUE: &str = "Value";
/// Type identifier of [`FieldValueFeature`]
pub const FIELD_VALUE: &str = "FieldValue";
/// Type identifier of [`OriginalScoreFeature`]
pub const ORIGINAL_SCORE: &str = "OriginalScore";
/// Type identifier of [`HasFieldFeature`]
pub const HAS_FIELD: &str = "HasField";
/// Type identifier of [`FieldLengthFeature`]
pub const FIELD_LENGTH: &str = "FieldLength";
/// Type identifier of [`FieldCharLengthFeature`]
pub const FIELD_CHAR_LENGTH: &str = "FieldCharLength";

pub(crate) fn register_defaults(registry: &mut FeatureRegistry) {
    registry.register(VALUE, |params| {
        Ok(Box::new(ValueFeature::from_params(params)?) as Box<dyn FeatureScorer>)
    });
    registry.register(FIELD_VALUE, |params| {
        Ok(Box::new(FieldValueFeature::from_params(params)?) as Box<dyn FeatureScorer>)
    });
    registry.register(ORIGINAL_SCORE, |_| {
        Ok(Box::new(OriginalScoreFeature) as Box<dyn FeatureScorer>)
    });
    registry.register(HAS_FIELD, |params| {
        Ok(Box::new(HasFieldFeature::from_params(params)?) as Box<dyn FeatureScorer>)
    });
    registry.register(FIELD_LENGTH, |params| {
        Ok(Box::new(FieldLengthFeature::from_params(params)?) as Box<dyn FeatureScorer>)
    });
    registry.register(FIELD_CHAR_LENGTH, |params| {
        Ok(Box::new(FieldCharLengthFeature::from_params(params)?) as Box<dyn FeatureScorer>)
    });
}

fn required_field(params: &NamedParams) -> LtrResult<String> {
    match params.get("field") {
        None => Err(LtrError::MissingParam("field".to_string())),
        Some(ParamValue::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(_) => Err(LtrError::invalid_param("field", "expected a non-empty string")),
    }
}

fn parse_value(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok()
}

// ============================================================================
// ValueFeature
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum ValueSource {
    Constant(f32),
    Template(String),
}

/// A constant, or a request-supplied value referenced through `${name}`
#[derive(Debug, Clone)]
pub struct ValueFeature {
    source: ValueSource,
    required: bool,
}

impl ValueFeature {
    /// Constant value
    pub fn constant(value: f32) -> Self {
        ValueFeature {
            source: ValueSource::Constant(value),
            required: false,
        }
    }

    /// Build from `value` and `required` params
    pub fn from_params(params: &NamedParams) -> LtrResult<Self> {
        let required = params.get_bool_or("required", false);
        let source = match params.get("value") {
            None => return Err(LtrError::MissingParam("value".to_string())),
            Some(ParamValue::String(s)) if macros::has_macro(s) => ValueSource::Template(s.clone()),
            Some(ParamValue::String(s)) => match parse_value(s) {
                Some(v) => ValueSource::Constant(v),
                None => return Err(LtrError::invalid_param("value", format!("'{}' is not a number", s))),
            },
            Some(other) => match other.as_f64() {
                Some(v) => ValueSource::Constant(v as f32),
                None => return Err(LtrError::invalid_param("value", "expected a number or a string")),
            },
        };
        Ok(ValueFeature { source, required })
    }

    /// True if a missing macro value is an error rather than a fallback
    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl FeatureScorer for ValueFeature {
    fn score(&self, ctx: &DocContext<'_>) -> LtrResult<Option<f32>> {
        let template = match &self.source {
            ValueSource::Constant(v) => return Ok(Some(*v)),
            ValueSource::Template(t) => t,
        };
        match macros::expand(template, ctx.request().efi()) {
            Some(expanded) => parse_value(&expanded).map(Some).ok_or_else(|| {
                LtrError::invalid_param("value", format!("'{}' is not a number", expanded))
            }),
            None if self.required => Err(LtrError::invalid_param(
                "value",
                format!("external feature info missing for required value {}", template),
            )),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        match &self.source {
            ValueSource::Constant(v) => format!("{} [value={}]", VALUE, format_f32(*v)),
            ValueSource::Template(t) => format!("{} [value={}]", VALUE, t),
        }
    }
}

// ============================================================================
// FieldValueFeature
// ============================================================================

/// Stored field value: numbers as is, booleans and `T`/`F` as 1/0
#[derive(Debug, Clone)]
pub struct FieldValueFeature {
    field: String,
}

impl FieldValueFeature {
    /// Build from the `field` param
    pub fn from_params(params: &NamedParams) -> LtrResult<Self> {
        Ok(FieldValueFeature {
            field: required_field(params)?,
        })
    }
}

impl FeatureScorer for FieldValueFeature {
    fn score(&self, ctx: &DocContext<'_>) -> LtrResult<Option<f32>> {
        Ok(match ctx.field(&self.field) {
            None => None,
            Some(FieldValue::Number(n)) => Some(*n as f32),
            Some(FieldValue::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Some(FieldValue::Text(t)) => match t.as_str() {
                "T" => Some(1.0),
                "F" => Some(0.0),
                other => parse_value(other),
            },
        })
    }

    fn describe(&self) -> String {
        format!("{} [field={}]", FIELD_VALUE, self.field)
    }
}

// ============================================================================
// OriginalScoreFeature
// ============================================================================

/// First-pass score of the document
#[derive(Debug, Clone, Copy)]
pub struct OriginalScoreFeature;

impl FeatureScorer for OriginalScoreFeature {
    fn score(&self, ctx: &DocContext<'_>) -> LtrResult<Option<f32>> {
        Ok(Some(ctx.original_score()))
    }

    fn describe(&self) -> String {
        ORIGINAL_SCORE.to_string()
    }
}

// ============================================================================
// HasFieldFeature
// ============================================================================

/// 1 when the document carries the field, else 0
#[derive(Debug, Clone)]
pub struct HasFieldFeature {
    field: String,
}

impl HasFieldFeature {
    /// Build from the `field` param
    pub fn from_params(params: &NamedParams) -> LtrResult<Self> {
        Ok(HasFieldFeature {
            field: required_field(params)?,
        })
    }
}

impl FeatureScorer for HasFieldFeature {
    fn score(&self, ctx: &DocContext<'_>) -> LtrResult<Option<f32>> {
        Ok(Some(if ctx.field(&self.field).is_some() { 1.0 } else { 0.0 }))
    }

    fn describe(&self) -> String {
        format!("{} [field={}]", HAS_FIELD, self.field)
    }
}

// ============================================================================
// FieldLengthFeature
// ============================================================================

/// Whitespace token count of a field; non-text values count as one token
#[derive(Debug, Clone)]
pub struct FieldLengthFeature {
    field: String,
}

impl FieldLengthFeature {
    /// Build from the `field` param
    pub fn from_params(params: &NamedParams) -> LtrResult<Self> {
        Ok(FieldLengthFeature {
            field: required_field(params)?,
        })
    }
}

impl FeatureScorer for FieldLengthFeature {
    fn score(&self, ctx: &DocContext<'_>) -> LtrResult<Option<f32>> {
        let len = match ctx.field(&self.field) {
            None => 0,
            Some(FieldValue::Text(t)) => t.split_whitespace().count(),
            Some(_) => 1,
        };
        Ok(Some(len as f32))
    }

    fn describe(&self) -> String {
        format!("{} [field={}]", FIELD_LENGTH, self.field)
    }
}

// ============================================================================
// FieldCharLengthFeature
// ============================================================================

/// Character count of a field's stored text; 0 when absent
#[derive(Debug, Clone)]
pub struct FieldCharLengthFeature {
    field: String,
}

impl FieldCharLengthFeature {
    /// Build from the `field` param
    pub fn from_params(params: &NamedParams) -> LtrResult<Self> {
        Ok(FieldCharLengthFeature {
            field: required_field(params)?,
        })
    }
}

impl FeatureScorer for FieldCharLengthFeature {
    fn score(&self, ctx: &DocContext<'_>) -> LtrResult<Option<f32>> {
        let len = match ctx.field(&self.field) {
            None => 0,
            Some(FieldValue::Text(t)) => t.chars().count(),
            Some(FieldValue::Number(n)) => format_f64(*n).chars().count(),
            Some(FieldValue::Bool(b)) => b.to_string().len(),
        };
        Ok(Some(len as f32))
    }

    fn describe(&self) -> String {
        format!("{} [field={}]", FIELD_CHAR_LENGTH, self.field)
    }
}
