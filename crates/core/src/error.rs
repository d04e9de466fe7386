//! Error types for ltrank
//!
//! This module defines the error taxonomy shared by the feature loader, the
//! normalizers, the model loader and the rescoring pipeline.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Loading errors are per-entry: the loaders catch them, log them and move on.
//! Nothing in this enum is expected to reach the per-document scoring path
//! except [`LtrError::Cancelled`].

use crate::name::NameError;
use std::io;
use thiserror::Error;

/// Result type alias for ltrank operations
pub type LtrResult<T> = std::result::Result<T, LtrError>;

/// Error types for ltrank
#[derive(Debug, Error)]
pub enum LtrError {
    /// Top-level configuration is not the expected array/object shape
    #[error("Invalid configuration shape: {0}")]
    ConfigurationShape(String),

    /// A single feature entry could not be turned into a feature
    #[error("Cannot create feature '{name}': {reason}")]
    FeatureDefinition {
        /// Name of the offending feature (may be empty if absent)
        name: String,
        /// Why construction failed
        reason: String,
    },

    /// A normalizer failed to initialize from its params
    #[error("Normalizer init failed: {0}")]
    NormalizerInit(String),

    /// A feature or param name failed the identifier predicate
    #[error("Invalid name '{name}': {source}")]
    NameValidation {
        /// The rejected name
        name: String,
        /// Detailed rejection reason
        #[source]
        source: NameError,
    },

    /// A store already holds a feature with this name
    #[error("Duplicate feature name '{name}' in store '{store}'")]
    DuplicateName {
        /// Store name
        store: String,
        /// Colliding feature name
        name: String,
    },

    /// A store already holds a feature with this id
    #[error("Duplicate feature id {id} in store '{store}'")]
    DuplicateId {
        /// Store name
        store: String,
        /// Colliding feature id
        id: usize,
    },

    /// A required param is absent
    #[error("Missing required param '{0}'")]
    MissingParam(String),

    /// A param is present but has an unusable value
    #[error("Invalid value for param '{name}': {reason}")]
    InvalidParam {
        /// Param key
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// No factory is registered for a type identifier
    #[error("Unknown {kind} type '{type_name}'")]
    UnknownType {
        /// What was being instantiated ("feature", "normalizer", "model")
        kind: &'static str,
        /// The unresolved type identifier
        type_name: String,
    },

    /// A feature referenced by name does not exist in a store
    #[error("Missing feature '{name}' in store '{store}'")]
    FeatureNotFound {
        /// Store name
        store: String,
        /// Feature name
        name: String,
    },

    /// A feature store referenced by name has not been published
    #[error("Feature store not found: {0}")]
    StoreNotFound(String),

    /// A model could not be built or looked up
    #[error("Model error: {0}")]
    Model(String),

    /// Evaluation was abandoned because the request was cancelled or timed out
    #[error("Scoring cancelled")]
    Cancelled,

    /// I/O error (reading configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(String),

    /// Engine configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LtrError {
    /// Create a configuration-shape error
    pub fn shape(msg: impl Into<String>) -> Self {
        LtrError::ConfigurationShape(msg.into())
    }

    /// Create a feature-definition error
    pub fn feature(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LtrError::FeatureDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a normalizer-init error
    pub fn normalizer(msg: impl Into<String>) -> Self {
        LtrError::NormalizerInit(msg.into())
    }

    /// Create an invalid-param error
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LtrError::InvalidParam {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown-type error
    pub fn unknown_type(kind: &'static str, type_name: impl Into<String>) -> Self {
        LtrError::UnknownType {
            kind,
            type_name: type_name.into(),
        }
    }

    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        LtrError::Model(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        LtrError::Config(msg.into())
    }

    /// True if this error came from cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LtrError::Cancelled)
    }
}

impl From<serde_json::Error> for LtrError {
    fn from(e: serde_json::Error) -> Self {
        LtrError::Json(e.to_string())
    }
}
