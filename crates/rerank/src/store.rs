//! Published models by name

use crate::model::ScoringModel;
use dashmap::DashMap;
use ltrank_core::{LtrError, LtrResult};
use std::sync::Arc;
use tracing::info;

/// Thread-safe map of model name to model
#[derive(Debug, Default)]
pub struct ModelStore {
    models: DashMap<String, Arc<dyn ScoringModel>>,
}

impl ModelStore {
    /// Create an empty model store
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a model under its name, returning the model it replaced
    pub fn publish(&self, model: Arc<dyn ScoringModel>) -> Option<Arc<dyn ScoringModel>> {
        info!(
            target: "ltr::model",
            model = %model.name(),
            store = %model.meta().feature_store_name(),
            features = model.meta().len(),
            "Publishing model"
        );
        self.models.insert(model.name().to_string(), model)
    }

    /// Current model by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ScoringModel>> {
        self.models.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Current model by name, failing if absent
    pub fn require(&self, name: &str) -> LtrResult<Arc<dyn ScoringModel>> {
        self.get(name)
            .ok_or_else(|| LtrError::model(format!("cannot find model '{}'", name)))
    }

    /// Remove a model
    pub fn remove(&self, name: &str) -> Option<Arc<dyn ScoringModel>> {
        self.models.remove(name).map(|(_, model)| model)
    }

    /// True if a model with this name is published
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Model names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of published models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if no model is published
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
