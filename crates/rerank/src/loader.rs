//! ModelLoader: JSON model definitions into scoring models
//!
//! Entry shape:
//!
//! ```json
//! {
//!   "name": "products_v2",
//!   "type": "Linear",
//!   "store": "products",
//!   "features": [{"name": "popularity", "norm": {"type": "MinMax", "params": {"min": 0, "max": 5}}}],
//!   "params": {"weights": {"popularity": 1.0}}
//! }
//! ```
//!
//! `store` defaults to the loader's default store. A failing model is
//! logged and skipped; the rest still load. The input may be an array of
//! entries, a single entry, or `{"models": [...]}`.

use crate::model::{ModelFeature, ModelMeta, ScoringModel};
use crate::registry::ModelRegistry;
use ltrank_core::{LtrError, LtrResult, NamedParams};
use ltrank_features::{FeatureStoreCatalog, NormalizerConfig, NormalizerRegistry, DEFAULT_STORE};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One `features` entry of a model definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelFeatureConfig {
    /// Store feature name
    pub name: String,
    /// Normalizer overriding the feature's own
    #[serde(default)]
    pub norm: Option<NormalizerConfig>,
}

/// A model definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Model name
    pub name: String,
    /// Registered model type
    #[serde(rename = "type")]
    pub type_name: String,
    /// Feature store name
    #[serde(default)]
    pub store: Option<String>,
    /// Features used for scoring, in model order
    #[serde(default)]
    pub features: Vec<ModelFeatureConfig>,
    /// Model params
    #[serde(default)]
    pub params: NamedParams,
}

/// A model entry that did not load
#[derive(Debug)]
pub struct SkippedModel {
    /// Position in the input
    pub index: usize,
    /// The raw entry
    pub entry: JsonValue,
    /// Why it was skipped
    pub reason: LtrError,
}

/// Outcome of loading model definitions
#[derive(Debug, Default)]
pub struct ModelLoadReport {
    /// Successfully built models, in input order
    pub models: Vec<Arc<dyn ScoringModel>>,
    /// Per-entry failures
    pub skipped: Vec<SkippedModel>,
}

/// Builds models against a catalog of published feature stores
#[derive(Debug, Clone, Copy)]
pub struct ModelLoader<'a> {
    models: &'a ModelRegistry,
    normalizers: &'a NormalizerRegistry,
    catalog: &'a FeatureStoreCatalog,
    default_store: &'a str,
}

impl<'a> ModelLoader<'a> {
    /// Create a loader
    pub fn new(
        models: &'a ModelRegistry,
        normalizers: &'a NormalizerRegistry,
        catalog: &'a FeatureStoreCatalog,
    ) -> Self {
        ModelLoader {
            models,
            normalizers,
            catalog,
            default_store: DEFAULT_STORE,
        }
    }

    /// Builder: store used by entries without `store`
    pub fn with_default_store(mut self, store: &'a str) -> Self {
        self.default_store = store;
        self
    }

    /// Load every model definition in `input`
    pub fn load(&self, input: &JsonValue) -> ModelLoadReport {
        let entries: Vec<&JsonValue> = match input {
            JsonValue::Array(items) => items.iter().collect(),
            JsonValue::Object(obj) => match obj.get("models") {
                Some(JsonValue::Array(items)) => items.iter().collect(),
                Some(_) => {
                    error!(target: "ltr::model", "'models' must be an array, nothing to load");
                    return ModelLoadReport::default();
                }
                None => vec![input],
            },
            other => {
                error!(target: "ltr::model", input = %other, "Expected model definitions, nothing to load");
                return ModelLoadReport::default();
            }
        };

        let mut report = ModelLoadReport::default();
        let mut seen = HashSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let outcome = serde_json::from_value::<ModelConfig>(entry.clone())
                .map_err(LtrError::from)
                .and_then(|config| {
                    if !seen.insert(config.name.clone()) {
                        return Err(LtrError::model(format!(
                            "duplicate model name '{}'",
                            config.name
                        )));
                    }
                    self.build(&config)
                });
            match outcome {
                Ok(model) => report.models.push(model),
                Err(reason) => {
                    warn!(
                        target: "ltr::model",
                        index,
                        entry = %entry,
                        error = %reason,
                        "Skipping model entry"
                    );
                    report.skipped.push(SkippedModel {
                        index,
                        entry: entry.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            target: "ltr::model",
            loaded = report.models.len(),
            skipped = report.skipped.len(),
            "Loaded models"
        );
        report
    }

    /// Load definitions from a JSON file
    pub fn load_file(&self, path: impl AsRef<Path>) -> LtrResult<ModelLoadReport> {
        let text = fs::read_to_string(path.as_ref())?;
        let value: JsonValue = serde_json::from_str(&text)?;
        Ok(self.load(&value))
    }

    /// Build one model
    pub fn build(&self, config: &ModelConfig) -> LtrResult<Arc<dyn ScoringModel>> {
        let store_name = config.store.as_deref().unwrap_or(self.default_store);
        let store = self.catalog.require(store_name)?;

        let mut features = Vec::with_capacity(config.features.len());
        for fc in &config.features {
            let feature = Arc::clone(store.get(&fc.name)?);
            let mf = match &fc.norm {
                Some(norm) => ModelFeature::with_normalizer(feature, self.normalizers.create(norm)?),
                None => ModelFeature::new(feature),
            };
            features.push(mf);
        }

        let meta = ModelMeta::new(
            config.name.clone(),
            config.type_name.clone(),
            store,
            features,
            config.params.clone(),
        )?;
        self.models.create(meta)
    }
}
