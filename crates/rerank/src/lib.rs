//! Scoring and rescoring for ltrank
//!
//! This crate provides:
//! - ScoringModel trait, ModelMeta and ModelFeature
//! - LinearModel, ConstantModel and the logging-only LoggingModel
//! - ModelRegistry / ModelLoader / ModelStore
//! - FeatureVector: the `@model:score;name:value` and JSON vector formats
//! - Rescorer: per-document scoring, explain, and batch reranking with
//!   cooperative cancellation and rayon-parallel evaluation
//! - RerankConfig (`ltr.toml`) and RerankEngine, the context object that
//!   wires registries, stores and models together
//!
//! # Usage
//!
//! ```ignore
//! use ltrank_rerank::{RerankConfig, RerankEngine};
//!
//! let engine = RerankEngine::open(RerankConfig::from_file(path)?)?;
//! let reranked = engine.rescorer("products_v2")?.rerank(&ctx, docs, 100)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod constant;
pub mod engine;
pub mod linear;
pub mod loader;
pub mod logging;
pub mod model;
pub mod registry;
pub mod rescorer;
pub mod store;
pub mod vector;

// Re-export commonly used types
pub use config::{RerankConfig, CONFIG_FILE_NAME};
pub use constant::ConstantModel;
pub use engine::{EngineSnapshot, ReloadSummary, RerankEngine};
pub use linear::LinearModel;
pub use loader::{ModelConfig, ModelFeatureConfig, ModelLoadReport, ModelLoader, SkippedModel};
pub use logging::LoggingModel;
pub use model::{ModelFeature, ModelMeta, ScoringModel};
pub use registry::{ModelFactory, ModelRegistry};
pub use rescorer::{Rescorer, ScoredDoc};
pub use store::ModelStore;
pub use vector::{FeatureVector, VectorFormat};
