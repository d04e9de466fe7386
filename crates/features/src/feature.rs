//! Features
//!
//! This module provides:
//! - FeatureScorer trait: the per-document value computation
//! - Feature: a scorer bound to a name, an id, params, a normalizer and a
//!   default value
//! - FeatureConfig: the `{name, type, params?, norm?, default?}` JSON form
//! - FeatureRegistry: type identifiers mapped to scorer factories

use crate::context::DocContext;
use crate::normalizer::{Normalizer, NormalizerConfig};
use ltrank_core::{format_f32, Explanation, LtrError, LtrResult, NamedParams};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// FeatureScorer Trait
// ============================================================================

/// Pluggable per-document value computation
///
/// Implementations must not keep per-document state: the same scorer is
/// evaluated concurrently for many documents.
pub trait FeatureScorer: Send + Sync + fmt::Debug {
    /// Raw value for the document
    ///
    /// `Ok(None)` means the feature has no value for this document and the
    /// feature's default should be used. `Err` is an evaluation failure.
    fn score(&self, ctx: &DocContext<'_>) -> LtrResult<Option<f32>>;

    /// Short description used in explanations
    fn describe(&self) -> String;
}

// ============================================================================
// FeatureConfig
// ============================================================================

/// Serializable feature description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Unique feature name
    pub name: String,
    /// Registered type identifier
    #[serde(rename = "type")]
    pub type_name: String,
    /// Params handed to the factory
    #[serde(default, skip_serializing_if = "NamedParams::is_empty")]
    pub params: NamedParams,
    /// Bound normalizer (Identity when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norm: Option<NormalizerConfig>,
    /// Value used when evaluation yields nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f32>,
}

// ============================================================================
// Feature
// ============================================================================

/// A named, normalized, per-document value
#[derive(Debug)]
pub struct Feature {
    name: String,
    id: usize,
    type_name: String,
    params: NamedParams,
    normalizer: Arc<dyn Normalizer>,
    default_value: f32,
    scorer: Box<dyn FeatureScorer>,
}

impl Feature {
    /// Bind a scorer to its identity
    pub fn new(
        name: impl Into<String>,
        id: usize,
        type_name: impl Into<String>,
        params: NamedParams,
        normalizer: Arc<dyn Normalizer>,
        default_value: f32,
        scorer: Box<dyn FeatureScorer>,
    ) -> Self {
        Feature {
            name: name.into(),
            id,
            type_name: type_name.into(),
            params,
            normalizer,
            default_value,
            scorer,
        }
    }

    /// Feature name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load-order id
    pub fn id(&self) -> usize {
        self.id
    }

    /// Registered type identifier
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Construction params
    pub fn params(&self) -> &NamedParams {
        &self.params
    }

    /// Bound normalizer
    pub fn normalizer(&self) -> &Arc<dyn Normalizer> {
        &self.normalizer
    }

    /// Fallback value
    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    /// Raw value, falling back to the default on absence or failure
    pub fn evaluate(&self, ctx: &DocContext<'_>) -> f32 {
        self.evaluate_inner(ctx).0
    }

    /// Normalize a raw value with the bound normalizer
    pub fn normalize(&self, raw: f32) -> f32 {
        self.normalizer.normalize(raw)
    }

    /// Explanation of the raw value
    pub fn explain(&self, ctx: &DocContext<'_>) -> Explanation {
        let (value, from_default) = self.evaluate_inner(ctx);
        let mut description = format!("{} [name={}]", self.scorer.describe(), self.name);
        if from_default {
            description.push_str(&format!(" default value {}", format_f32(self.default_value)));
        }
        Explanation::new(value, description)
    }

    /// Config that reproduces this feature
    pub fn to_config(&self) -> FeatureConfig {
        FeatureConfig {
            name: self.name.clone(),
            type_name: self.type_name.clone(),
            params: self.params.clone(),
            norm: Some(self.normalizer.to_config()),
            default: Some(self.default_value),
        }
    }

    fn evaluate_inner(&self, ctx: &DocContext<'_>) -> (f32, bool) {
        match self.scorer.score(ctx) {
            Ok(Some(value)) => (value, false),
            Ok(None) => {
                debug!(
                    target: "ltr::rescore",
                    feature = %self.name,
                    doc = %ctx.doc().id,
                    "No value, using default"
                );
                (self.default_value, true)
            }
            Err(e) => {
                warn!(
                    target: "ltr::rescore",
                    feature = %self.name,
                    doc = %ctx.doc().id,
                    error = %e,
                    "Feature evaluation failed, using default"
                );
                (self.default_value, true)
            }
        }
    }
}

// ============================================================================
// FeatureRegistry
// ============================================================================

/// Factory building a scorer from its params
pub type FeatureFactory =
    Arc<dyn Fn(&NamedParams) -> LtrResult<Box<dyn FeatureScorer>> + Send + Sync>;

/// Type-identifier keyed feature factories
#[derive(Clone)]
pub struct FeatureRegistry {
    factories: HashMap<String, FeatureFactory>,
}

impl FeatureRegistry {
    /// Empty registry
    pub fn empty() -> Self {
        FeatureRegistry {
            factories: HashMap::new(),
        }
    }

    /// Registry with every shipped feature kind registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        crate::kinds::register_defaults(&mut registry);
        registry
    }

    /// Register (or replace) a factory
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&NamedParams) -> LtrResult<Box<dyn FeatureScorer>> + Send + Sync + 'static,
    {
        self.factories.insert(type_name.into(), Arc::new(factory));
    }

    /// True if a factory is registered for `type_name`
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Instantiate a scorer
    pub fn create(&self, type_name: &str, params: &NamedParams) -> LtrResult<Box<dyn FeatureScorer>> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| LtrError::unknown_type("feature", type_name))?;
        factory(params)
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.factories.keys().collect();
        types.sort();
        f.debug_struct("FeatureRegistry").field("types", &types).finish()
    }
}
