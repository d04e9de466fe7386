//! Logging-only model
//!
//! Uses no features and always scores 0. Every store feature is still
//! evaluated and reported through the feature vector, which is the point:
//! callers get raw and normalized values without a ranking decision.

use crate::model::{ModelMeta, ScoringModel};
use ltrank_core::{Explanation, LtrResult, NamedParams};
use ltrank_features::{DocContext, FeatureStore};
use std::sync::Arc;

/// Type identifier of [`LoggingModel`]
pub const LOGGING: &str = "Logging";

/// Description fragment marking a logging-only pass
pub const LOGGING_ONLY: &str = "used only for logging features (no ranking)";

/// Scores 0, reports every feature of its store
#[derive(Debug, Clone)]
pub struct LoggingModel {
    meta: ModelMeta,
}

impl LoggingModel {
    /// Logging model named after the store
    pub fn new(store: Arc<FeatureStore>) -> LtrResult<Self> {
        let name = store.name().to_string();
        Self::named(name, store)
    }

    /// Logging model with an explicit name
    pub fn named(name: impl Into<String>, store: Arc<FeatureStore>) -> LtrResult<Self> {
        let meta = ModelMeta::new(name, LOGGING, store, Vec::new(), NamedParams::new())?;
        Ok(LoggingModel { meta })
    }
}

impl ScoringModel for LoggingModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn score(&self, _vector: &[f32]) -> f32 {
        0.0
    }

    fn explain(&self, _ctx: &DocContext<'_>, final_score: f32, _features: &[Explanation]) -> Explanation {
        Explanation::new(
            final_score,
            format!("{} logging model, {}", self.meta.name(), LOGGING_ONLY),
        )
    }

    fn is_logging(&self) -> bool {
        true
    }
}
