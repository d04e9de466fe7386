//! Linear model: `intercept + Σ wᵢ·xᵢ`
//!
//! Params:
//!
//! ```json
//! {"weights": {"popularity": 0.5, "recency": 1.5}, "intercept": 0.1}
//! ```
//!
//! Every model feature needs a weight; weights for features the model does
//! not use are rejected.

use crate::model::{ModelMeta, ScoringModel};
use ltrank_core::{format_f32, Explanation, LtrError, LtrResult};
use ltrank_features::DocContext;

/// Type identifier of [`LinearModel`]
pub const LINEAR: &str = "Linear";

/// Weighted sum over the model features
#[derive(Debug, Clone)]
pub struct LinearModel {
    meta: ModelMeta,
    weights: Vec<f32>,
    intercept: f32,
}

impl LinearModel {
    /// Build from `weights` and the optional `intercept` param
    pub fn new(meta: ModelMeta) -> LtrResult<Self> {
        let weights_param = meta.params().get_map("weights").ok_or_else(|| {
            LtrError::model(format!("model '{}' needs a 'weights' object", meta.name()))
        })?;

        let mut weights = Vec::with_capacity(meta.len());
        for mf in meta.features() {
            let weight = weights_param
                .get(mf.name())
                .ok_or_else(|| {
                    LtrError::model(format!(
                        "model '{}' has no weight for feature '{}'",
                        meta.name(),
                        mf.name()
                    ))
                })?
                .as_f64()
                .ok_or_else(|| {
                    LtrError::model(format!(
                        "model '{}' has a non-numeric weight for feature '{}'",
                        meta.name(),
                        mf.name()
                    ))
                })?;
            weights.push(weight as f32);
        }
        if let Some((unused, _)) = weights_param
            .iter()
            .find(|(key, _)| !meta.features().any(|mf| mf.name() == *key))
        {
            return Err(LtrError::model(format!(
                "model '{}' has a weight for unknown feature '{}'",
                meta.name(),
                unused
            )));
        }

        let intercept = match meta.params().get("intercept") {
            None => 0.0,
            Some(v) => v.as_f64().ok_or_else(|| {
                LtrError::invalid_param("intercept", "expected a number")
            })? as f32,
        };

        Ok(LinearModel {
            meta,
            weights,
            intercept,
        })
    }

    /// Weights in model feature order
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Constant term
    pub fn intercept(&self) -> f32 {
        self.intercept
    }
}

impl ScoringModel for LinearModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn score(&self, vector: &[f32]) -> f32 {
        self.meta.assert_vector(vector);
        self.weights
            .iter()
            .zip(vector)
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }

    fn explain(&self, _ctx: &DocContext<'_>, final_score: f32, features: &[Explanation]) -> Explanation {
        let mut details = Vec::with_capacity(self.weights.len() + 1);
        if self.intercept != 0.0 {
            details.push(Explanation::new(self.intercept, "intercept"));
        }
        for (weight, feature) in self.weights.iter().zip(self.meta.select(features)) {
            details.push(Explanation::with_details(
                weight * feature.value(),
                "prod of:",
                vec![
                    Explanation::new(*weight, "weight on feature"),
                    feature.clone(),
                ],
            ));
        }
        Explanation::with_details(
            final_score,
            format!(
                "{}(name={},intercept={}) model applied to features, sum of:",
                LINEAR,
                self.meta.name(),
                format_f32(self.intercept)
            ),
            details,
        )
    }
}
