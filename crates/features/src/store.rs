//! FeatureStore: the ordered, dually indexed feature collection
//!
//! Iteration order is load order, and is the canonical order of every
//! "all features" output. Stores are built once by the loader and then
//! shared read-only behind an `Arc`; there is no removal.

use crate::feature::Feature;
use ltrank_core::{LtrError, LtrResult};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Store name used when a request does not name one
pub const DEFAULT_STORE: &str = "_DEFAULT_";

/// Ordered collection of features indexed by name and by id
#[derive(Debug, Default)]
pub struct FeatureStore {
    name: String,
    version: Option<f32>,
    features: Vec<Arc<Feature>>,
    by_name: FxHashMap<String, usize>,
    by_id: FxHashMap<usize, usize>,
}

impl FeatureStore {
    /// Create an empty store
    pub fn new(name: impl Into<String>) -> Self {
        FeatureStore {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration version, if the source declared one
    pub fn version(&self) -> Option<f32> {
        self.version
    }

    /// Record the configuration version
    pub fn set_version(&mut self, version: Option<f32>) {
        self.version = version;
    }

    /// Append a feature
    ///
    /// # Errors
    ///
    /// [`LtrError::DuplicateName`] or [`LtrError::DuplicateId`] if a feature
    /// with the same name or id exists; the store is left unchanged.
    pub fn add(&mut self, feature: Feature) -> LtrResult<Arc<Feature>> {
        if self.by_name.contains_key(feature.name()) {
            return Err(LtrError::DuplicateName {
                store: self.name.clone(),
                name: feature.name().to_string(),
            });
        }
        if self.by_id.contains_key(&feature.id()) {
            return Err(LtrError::DuplicateId {
                store: self.name.clone(),
                id: feature.id(),
            });
        }
        let pos = self.features.len();
        self.by_name.insert(feature.name().to_string(), pos);
        self.by_id.insert(feature.id(), pos);
        let feature = Arc::new(feature);
        self.features.push(Arc::clone(&feature));
        Ok(feature)
    }

    /// Lookup by name
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<Feature>> {
        self.by_name.get(name).map(|&pos| &self.features[pos])
    }

    /// Lookup by name, failing with [`LtrError::FeatureNotFound`]
    pub fn get(&self, name: &str) -> LtrResult<&Arc<Feature>> {
        self.get_by_name(name).ok_or_else(|| LtrError::FeatureNotFound {
            store: self.name.clone(),
            name: name.to_string(),
        })
    }

    /// Lookup by load-order id
    pub fn get_by_id(&self, id: usize) -> Option<&Arc<Feature>> {
        self.by_id.get(&id).map(|&pos| &self.features[pos])
    }

    /// True if a feature with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Features in load order; restartable
    pub fn features(&self) -> impl Iterator<Item = &Arc<Feature>> + '_ {
        self.features.iter()
    }

    /// Features in load order as a slice
    pub fn as_slice(&self) -> &[Arc<Feature>] {
        &self.features
    }

    /// Feature names in load order
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if the store holds no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
