//! Constant model: every document gets `params.value` (1.0 by default)
//!
//! Useful with a feature-less model to surface feature vectors with a fixed
//! score, or as a placeholder while a real model is trained.

use crate::model::{ModelMeta, ScoringModel};
use ltrank_core::{format_f32, Explanation, LtrError, LtrResult};
use ltrank_features::DocContext;

/// Type identifier of [`ConstantModel`]
pub const CONSTANT: &str = "Constant";

/// Scores every document with the same value
#[derive(Debug, Clone)]
pub struct ConstantModel {
    meta: ModelMeta,
    value: f32,
}

impl ConstantModel {
    /// Build from the optional `value` param
    pub fn new(meta: ModelMeta) -> LtrResult<Self> {
        let value = match meta.params().get("value") {
            None => 1.0,
            Some(v) => v
                .as_f64()
                .ok_or_else(|| LtrError::invalid_param("value", "expected a number"))?
                as f32,
        };
        Ok(ConstantModel { meta, value })
    }

    /// The constant score
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl ScoringModel for ConstantModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn score(&self, vector: &[f32]) -> f32 {
        self.meta.assert_vector(vector);
        self.value
    }

    fn explain(&self, _ctx: &DocContext<'_>, final_score: f32, features: &[Explanation]) -> Explanation {
        Explanation::with_details(
            final_score,
            format!(
                "{}(name={}) constant score {}",
                CONSTANT,
                self.meta.name(),
                format_f32(self.value)
            ),
            self.meta.select(features).cloned().collect(),
        )
    }
}
