//! RerankEngine: the explicit context object wiring everything together
//!
//! Owns the feature, normalizer and model registries, the engine config,
//! and the current snapshot of published feature stores and models.
//! `reload` builds a complete new snapshot off to the side and swaps it in
//! under a write lock held only for the pointer swap; rescorers handed out
//! earlier keep the models they were created with.

use crate::config::RerankConfig;
use crate::loader::ModelLoader;
use crate::logging::LoggingModel;
use crate::registry::ModelRegistry;
use crate::rescorer::Rescorer;
use crate::store::ModelStore;
use ltrank_core::{LtrError, LtrResult};
use ltrank_features::{FeatureLoader, FeatureRegistry, FeatureStoreCatalog, NormalizerRegistry};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Published stores and models, replaced as a unit on reload
#[derive(Debug, Default)]
pub struct EngineSnapshot {
    /// Feature stores by name
    pub catalog: Arc<FeatureStoreCatalog>,
    /// Models by name
    pub models: Arc<ModelStore>,
}

/// Counts from one load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    /// Published store names
    pub stores: Vec<String>,
    /// Feature entries skipped across all stores
    pub skipped_features: usize,
    /// Published model names
    pub models: Vec<String>,
    /// Model entries skipped
    pub skipped_models: usize,
}

/// Reranking engine
#[derive(Debug)]
pub struct RerankEngine {
    config: RerankConfig,
    features: FeatureRegistry,
    normalizers: NormalizerRegistry,
    model_types: ModelRegistry,
    snapshot: RwLock<Arc<EngineSnapshot>>,
}

impl RerankEngine {
    /// Open with the shipped feature, normalizer and model kinds
    pub fn open(config: RerankConfig) -> LtrResult<Self> {
        Self::with_registries(
            config,
            FeatureRegistry::with_defaults(),
            NormalizerRegistry::with_defaults(),
            ModelRegistry::with_defaults(),
        )
    }

    /// Open from an `ltr.toml` file
    pub fn open_path(path: &Path) -> LtrResult<Self> {
        Self::open(RerankConfig::from_file(path)?)
    }

    /// Open with custom registries
    pub fn with_registries(
        config: RerankConfig,
        features: FeatureRegistry,
        normalizers: NormalizerRegistry,
        model_types: ModelRegistry,
    ) -> LtrResult<Self> {
        config.validate()?;
        let engine = RerankEngine {
            config,
            features,
            normalizers,
            model_types,
            snapshot: RwLock::new(Arc::new(EngineSnapshot::default())),
        };
        engine.reload()?;
        Ok(engine)
    }

    /// Reload every store and model from disk and publish them together
    ///
    /// On error the current snapshot stays in place.
    pub fn reload(&self) -> LtrResult<ReloadSummary> {
        let (snapshot, summary) = self.build_snapshot()?;
        *self.snapshot.write() = Arc::new(snapshot);
        info!(
            target: "ltr::config",
            stores = summary.stores.len(),
            models = summary.models.len(),
            skipped_features = summary.skipped_features,
            skipped_models = summary.skipped_models,
            "Published engine snapshot"
        );
        Ok(summary)
    }

    fn build_snapshot(&self) -> LtrResult<(EngineSnapshot, ReloadSummary)> {
        let dir = &self.config.feature_store_dir;
        if !dir.is_dir() {
            return Err(LtrError::config(format!(
                "feature_store_dir '{}' is not a directory",
                dir.display()
            )));
        }

        let feature_loader = FeatureLoader::new(&self.features, &self.normalizers)
            .with_default_value(self.config.default_feature_value);
        let catalog = FeatureStoreCatalog::new();
        let mut summary = ReloadSummary::default();
        for (store, skipped) in catalog.load_dir(dir, &feature_loader)? {
            summary.stores.push(store);
            summary.skipped_features += skipped;
        }

        let models = ModelStore::new();
        if let Some(models_file) = &self.config.models_file {
            let report = ModelLoader::new(&self.model_types, &self.normalizers, &catalog)
                .with_default_store(&self.config.default_feature_store)
                .load_file(models_file)?;
            summary.skipped_models = report.skipped.len();
            for model in report.models {
                summary.models.push(model.name().to_string());
                models.publish(model);
            }
        }

        if summary.skipped_features + summary.skipped_models > 0 {
            warn!(
                target: "ltr::config",
                skipped_features = summary.skipped_features,
                skipped_models = summary.skipped_models,
                "Some definitions were skipped"
            );
        }

        Ok((
            EngineSnapshot {
                catalog: Arc::new(catalog),
                models: Arc::new(models),
            },
            summary,
        ))
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Current feature store catalog
    pub fn catalog(&self) -> Arc<FeatureStoreCatalog> {
        Arc::clone(&self.snapshot().catalog)
    }

    /// Current model store
    pub fn models(&self) -> Arc<ModelStore> {
        Arc::clone(&self.snapshot().models)
    }

    /// Engine configuration
    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    /// Feature kinds
    pub fn feature_registry(&self) -> &FeatureRegistry {
        &self.features
    }

    /// Normalizer kinds
    pub fn normalizer_registry(&self) -> &NormalizerRegistry {
        &self.normalizers
    }

    /// Model kinds
    pub fn model_registry(&self) -> &ModelRegistry {
        &self.model_types
    }

    /// Rescorer bound to the current version of a model
    pub fn rescorer(&self, model_name: &str) -> LtrResult<Rescorer> {
        let model = self.models().require(model_name)?;
        Ok(self.configure(Rescorer::new(model)))
    }

    /// Rescorer that reports every feature of a store without ranking
    pub fn logging_rescorer(&self, store_name: &str) -> LtrResult<Rescorer> {
        let store = self.catalog().require(store_name)?;
        let model = LoggingModel::new(store)?;
        Ok(self.configure(Rescorer::new(Arc::new(model))))
    }

    fn configure(&self, rescorer: Rescorer) -> Rescorer {
        rescorer
            .with_parallel_threshold(self.config.parallel_threshold)
            .with_vector_format(self.config.vector_format)
    }
}
