//! Published feature stores by name
//!
//! Publication replaces the whole `Arc<FeatureStore>` for a name. Readers
//! that already hold an `Arc` keep scoring against the snapshot they
//! started with; no store is ever mutated after it is published.

use crate::loader::FeatureLoader;
use crate::store::FeatureStore;
use dashmap::DashMap;
use ltrank_core::{LtrError, LtrResult};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Thread-safe map of store name to published store
#[derive(Debug, Default)]
pub struct FeatureStoreCatalog {
    stores: DashMap<String, Arc<FeatureStore>>,
}

impl FeatureStoreCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a store under its own name, returning the store it replaced
    pub fn publish(&self, store: FeatureStore) -> Option<Arc<FeatureStore>> {
        self.publish_arc(Arc::new(store))
    }

    /// Publish an already shared store
    pub fn publish_arc(&self, store: Arc<FeatureStore>) -> Option<Arc<FeatureStore>> {
        info!(
            target: "ltr::catalog",
            store = %store.name(),
            features = store.len(),
            "Publishing feature store"
        );
        self.stores.insert(store.name().to_string(), store)
    }

    /// Current snapshot of a store
    pub fn get(&self, name: &str) -> Option<Arc<FeatureStore>> {
        self.stores.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Current snapshot of a store, failing with [`LtrError::StoreNotFound`]
    pub fn require(&self, name: &str) -> LtrResult<Arc<FeatureStore>> {
        self.get(name)
            .ok_or_else(|| LtrError::StoreNotFound(name.to_string()))
    }

    /// Published store names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of published stores
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// True if nothing is published
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Load and publish every `*.json` file in `dir`, in file-name order
    ///
    /// Returns `(store name, skipped entry count)` per published store.
    /// Entry-level failures are logged by the loader. Files whose stem is
    /// not a valid store name are skipped with a warning; only I/O failures
    /// abort.
    pub fn load_dir(
        &self,
        dir: impl AsRef<Path>,
        loader: &FeatureLoader<'_>,
    ) -> LtrResult<Vec<(String, usize)>> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut published = Vec::with_capacity(paths.len());
        for path in paths {
            let report = match loader.load_file(&path) {
                Ok(report) => report,
                Err(e @ LtrError::NameValidation { .. }) => {
                    warn!(
                        target: "ltr::catalog",
                        path = %path.display(),
                        error = %e,
                        "Skipping feature store file with invalid store name"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            published.push((report.store.name().to_string(), report.skipped.len()));
            self.publish(report.store);
        }
        info!(
            target: "ltr::catalog",
            dir = %dir.display(),
            stores = published.len(),
            "Loaded feature store directory"
        );
        Ok(published)
    }
}
