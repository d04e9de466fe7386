//! Feature layer for ltrank
//!
//! This crate provides:
//! - Normalizer trait with Identity, MinMax and Standard implementations
//! - FeatureScorer trait and the shipped feature kinds
//! - Feature / FeatureStore: named, id-indexed, load-ordered features
//! - FeatureLoader: JSON definitions into stores, skipping bad entries
//! - FeatureStoreCatalog: atomic publication of stores by name
//! - ScoringContext / DocContext: request and per-document evaluation state
//!
//! # Usage
//!
//! ```ignore
//! use ltrank_features::{FeatureLoader, FeatureRegistry, NormalizerRegistry};
//!
//! let features = FeatureRegistry::with_defaults();
//! let normalizers = NormalizerRegistry::with_defaults();
//! let report = FeatureLoader::new(&features, &normalizers).load_file("products.json")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod context;
pub mod feature;
pub mod kinds;
pub mod loader;
pub mod macros;
pub mod normalizer;
pub mod store;

// Re-export commonly used types
pub use catalog::FeatureStoreCatalog;
pub use context::{CancellationToken, DocContext, FieldValue, RerankDoc, ScoringContext};
pub use feature::{Feature, FeatureConfig, FeatureFactory, FeatureRegistry, FeatureScorer};
pub use kinds::{
    FieldCharLengthFeature, FieldLengthFeature, FieldValueFeature, HasFieldFeature,
    OriginalScoreFeature, ValueFeature,
};
pub use loader::{FeatureLoader, LoadReport, SkippedEntry};
pub use normalizer::{
    IdentityNormalizer, MinMaxNormalizer, Normalizer, NormalizerConfig, NormalizerFactory,
    NormalizerRegistry, StandardNormalizer,
};
pub use store::{FeatureStore, DEFAULT_STORE};
