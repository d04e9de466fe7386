//! Scoring model abstraction
//!
//! This module provides:
//! - ScoringModel trait: normalized feature vector in, one score out
//! - ModelMeta: name, bound store, used features and all features
//! - ModelFeature: a store feature plus the normalizer the model applies
//!
//! The vector handed to [`ScoringModel::score`] follows the model's own
//! feature order, not the store's. Explanations handed to
//! [`ScoringModel::explain`] follow `all_features` order.

use ltrank_core::{Explanation, LtrError, LtrResult, NameValidator, NamedParams};
use ltrank_features::{DocContext, Feature, FeatureStore, Normalizer};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// ModelFeature
// ============================================================================

/// A store feature as seen by a model
#[derive(Debug, Clone)]
pub struct ModelFeature {
    feature: Arc<Feature>,
    normalizer: Arc<dyn Normalizer>,
}

impl ModelFeature {
    /// Use the feature's own normalizer
    pub fn new(feature: Arc<Feature>) -> Self {
        let normalizer = Arc::clone(feature.normalizer());
        ModelFeature {
            feature,
            normalizer,
        }
    }

    /// Override the feature's normalizer for this model
    pub fn with_normalizer(feature: Arc<Feature>, normalizer: Arc<dyn Normalizer>) -> Self {
        ModelFeature {
            feature,
            normalizer,
        }
    }

    /// Feature name
    pub fn name(&self) -> &str {
        self.feature.name()
    }

    /// Underlying store feature
    pub fn feature(&self) -> &Arc<Feature> {
        &self.feature
    }

    /// Normalizer applied by this model
    pub fn normalizer(&self) -> &Arc<dyn Normalizer> {
        &self.normalizer
    }

    /// Evaluate and normalize against one document
    pub fn value(&self, ctx: &DocContext<'_>) -> f32 {
        self.normalizer.normalize(self.feature.evaluate(ctx))
    }

    /// Normalized explanation with the raw explanation nested inside
    pub fn explain(&self, ctx: &DocContext<'_>) -> Explanation {
        self.normalizer.explain(self.feature.explain(ctx))
    }
}

// ============================================================================
// ModelMeta
// ============================================================================

/// Everything a model knows about its inputs
#[derive(Debug, Clone)]
pub struct ModelMeta {
    name: String,
    type_name: String,
    store: Arc<FeatureStore>,
    all_features: Vec<ModelFeature>,
    positions: Vec<usize>,
    params: NamedParams,
}

impl ModelMeta {
    /// Bind a model to a store
    ///
    /// `features` is the ordered subset used for scoring. Every store
    /// feature is part of `all_features`; features used by the model carry
    /// the model's normalizer there as well.
    ///
    /// # Errors
    ///
    /// - invalid model name
    /// - a model feature that is not in the store
    /// - a feature listed twice
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        store: Arc<FeatureStore>,
        features: Vec<ModelFeature>,
        params: NamedParams,
    ) -> LtrResult<Self> {
        let name = name.into();
        NameValidator::require(&name)?;

        let mut all_features: Vec<ModelFeature> =
            store.features().map(|f| ModelFeature::new(Arc::clone(f))).collect();
        let mut positions = Vec::with_capacity(features.len());
        for mf in features {
            let pos = store
                .as_slice()
                .iter()
                .position(|f| f.name() == mf.name() && Arc::ptr_eq(f, mf.feature()))
                .ok_or_else(|| LtrError::FeatureNotFound {
                    store: store.name().to_string(),
                    name: mf.name().to_string(),
                })?;
            if positions.contains(&pos) {
                return Err(LtrError::model(format!(
                    "model '{}' lists feature '{}' more than once",
                    name,
                    mf.name()
                )));
            }
            positions.push(pos);
            all_features[pos] = mf;
        }

        Ok(ModelMeta {
            name,
            type_name: type_name.into(),
            store,
            all_features,
            positions,
            params,
        })
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered type identifier
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the bound store
    pub fn feature_store_name(&self) -> &str {
        self.store.name()
    }

    /// The bound store snapshot
    pub fn store(&self) -> &Arc<FeatureStore> {
        &self.store
    }

    /// Features used for scoring, in model order
    pub fn features(&self) -> impl Iterator<Item = &ModelFeature> + '_ {
        self.positions.iter().map(move |&p| &self.all_features[p])
    }

    /// Every feature computed for logging and explain, in store order
    pub fn all_features(&self) -> &[ModelFeature] {
        &self.all_features
    }

    /// Position in `all_features` of each scoring feature
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of scoring features (the expected vector length)
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True if the model scores without features
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Model params
    pub fn params(&self) -> &NamedParams {
        &self.params
    }

    /// Panics unless `vector` matches the model's feature count
    #[inline]
    pub fn assert_vector(&self, vector: &[f32]) {
        assert_eq!(
            vector.len(),
            self.positions.len(),
            "model '{}' expects {} features",
            self.name,
            self.positions.len()
        );
    }

    /// Pick the scoring features' entries out of an `all_features`-aligned slice
    pub fn select<'a, T>(&'a self, all: &'a [T]) -> impl Iterator<Item = &'a T> + 'a {
        self.positions.iter().map(move |&p| &all[p])
    }
}

// ============================================================================
// ScoringModel Trait
// ============================================================================

/// Pluggable scoring interface
///
/// # Thread Safety
///
/// One model instance scores every document of every concurrent request.
/// `score` must be a pure function of the vector.
pub trait ScoringModel: Send + Sync + fmt::Debug {
    /// Name, store binding and features
    fn meta(&self) -> &ModelMeta;

    /// Combine a normalized vector (model feature order) into one score
    ///
    /// # Panics
    ///
    /// If the vector length differs from the model's feature count.
    fn score(&self, vector: &[f32]) -> f32;

    /// Justify `final_score`; `features` is aligned with `all_features`
    fn explain(&self, ctx: &DocContext<'_>, final_score: f32, features: &[Explanation]) -> Explanation;

    /// Model name
    fn name(&self) -> &str {
        self.meta().name()
    }

    /// True for models that only surface feature values
    fn is_logging(&self) -> bool {
        false
    }
}
