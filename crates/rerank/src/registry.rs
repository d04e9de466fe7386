//! Type-identifier keyed model factories

use crate::constant::{ConstantModel, CONSTANT};
use crate::linear::{LinearModel, LINEAR};
use crate::logging::{LoggingModel, LOGGING};
use crate::model::{ModelMeta, ScoringModel};
use ltrank_core::{LtrError, LtrResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Factory building a model from its bound metadata
pub type ModelFactory = Arc<dyn Fn(ModelMeta) -> LtrResult<Arc<dyn ScoringModel>> + Send + Sync>;

/// Model factories by type identifier
#[derive(Clone)]
pub struct ModelRegistry {
    factories: HashMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// Empty registry
    pub fn empty() -> Self {
        ModelRegistry {
            factories: HashMap::new(),
        }
    }

    /// Registry with Linear, Constant and Logging registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(LINEAR, |meta| {
            Ok(Arc::new(LinearModel::new(meta)?) as Arc<dyn ScoringModel>)
        });
        registry.register(CONSTANT, |meta| {
            Ok(Arc::new(ConstantModel::new(meta)?) as Arc<dyn ScoringModel>)
        });
        registry.register(LOGGING, |meta| {
            if !meta.is_empty() {
                return Err(LtrError::model(format!(
                    "logging model '{}' cannot use features",
                    meta.name()
                )));
            }
            let model = LoggingModel::named(meta.name(), Arc::clone(meta.store()))?;
            Ok(Arc::new(model) as Arc<dyn ScoringModel>)
        });
        registry
    }

    /// Register (or replace) a factory
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(ModelMeta) -> LtrResult<Arc<dyn ScoringModel>> + Send + Sync + 'static,
    {
        self.factories.insert(type_name.into(), Arc::new(factory));
    }

    /// True if a factory is registered for `type_name`
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Instantiate the model `meta` describes
    pub fn create(&self, meta: ModelMeta) -> LtrResult<Arc<dyn ScoringModel>> {
        let factory = self
            .factories
            .get(meta.type_name())
            .ok_or_else(|| LtrError::unknown_type("model", meta.type_name()))?;
        factory(meta)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.factories.keys().collect();
        types.sort();
        f.debug_struct("ModelRegistry").field("types", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltrank_core::NamedParams;
    use ltrank_features::FeatureStore;

    fn meta(type_name: &str) -> ModelMeta {
        ModelMeta::new(
            "m",
            type_name,
            Arc::new(FeatureStore::new("s")),
            vec![],
            NamedParams::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let registry = ModelRegistry::with_defaults();
        assert!(registry.contains(LINEAR));
        assert!(registry.contains(CONSTANT));
        let logging = registry.create(meta(LOGGING)).unwrap();
        assert!(logging.is_logging());
        assert_eq!(registry.create(meta(CONSTANT)).unwrap().score(&[]), 1.0);
    }

    #[test]
    fn test_unknown_type() {
        let err = ModelRegistry::with_defaults().create(meta("Forest")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown model type 'Forest'");
    }
}
