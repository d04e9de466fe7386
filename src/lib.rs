//! ltrank - feature normalization and learning-to-rank scoring
//!
//! ltrank turns independently defined per-document signals ("features")
//! into one comparable, explainable score during a second-pass rerank.
//! Features, normalizers and models are loaded from JSON definitions at
//! runtime; new kinds are added by registering factories.
//!
//! # Quick Start
//!
//! ```ignore
//! use ltrank::{RerankConfig, RerankEngine, RerankDoc, ScoringContext};
//!
//! let engine = RerankEngine::open(RerankConfig::from_file("ltr.toml".as_ref())?)?;
//! let ctx = ScoringContext::new().with_efi("user_query", "red shoes");
//! let reranked = engine.rescorer("products_v2")?.rerank(&ctx, docs, 100)?;
//!
//! // Feature logging without ranking
//! let vector = engine.logging_rescorer("products")?.render_vector(&ctx, &doc)?;
//! // "@products:0.0;popularity:3.0;recency:0.25"
//! ```
//!
//! # Architecture
//!
//! - `ltrank-core`: errors, params, name validation, explanations
//! - `ltrank-features`: normalizers, features, stores, loading, catalog
//! - `ltrank-rerank`: models, vector formats, rescoring, engine

pub use ltrank_core::{
    format_f32, format_f64, Explanation, LtrError, LtrResult, NameError, NameValidator,
    NamedParams, ParamValue,
};
pub use ltrank_features::{
    CancellationToken, DocContext, Feature, FeatureConfig, FeatureFactory, FeatureLoader,
    FeatureRegistry, FeatureScorer, FeatureStore, FeatureStoreCatalog, FieldCharLengthFeature,
    FieldLengthFeature, FieldValue, FieldValueFeature, HasFieldFeature, IdentityNormalizer,
    LoadReport,
    MinMaxNormalizer, Normalizer, NormalizerConfig, NormalizerFactory, NormalizerRegistry,
    OriginalScoreFeature, RerankDoc, ScoringContext, SkippedEntry, StandardNormalizer,
    ValueFeature, DEFAULT_STORE,
};
pub use ltrank_rerank::{
    ConstantModel, EngineSnapshot, FeatureVector, LinearModel, LoggingModel, ModelConfig,
    ModelFactory, ModelFeature, ModelFeatureConfig, ModelLoadReport, ModelLoader, ModelMeta,
    ModelRegistry, ModelStore, ReloadSummary, RerankConfig, RerankEngine, Rescorer, ScoredDoc,
    ScoringModel, SkippedModel, VectorFormat, CONFIG_FILE_NAME,
};
