//! Engine configuration via `ltr.toml`
//!
//! A default `ltr.toml` can be written next to the feature store directory.
//! To change settings, edit the file and reload the engine.

use crate::vector::VectorFormat;
use ltrank_core::{LtrError, LtrResult, NameValidator};
use ltrank_features::DEFAULT_STORE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "ltr.toml";

/// Engine configuration loaded from `ltr.toml`.
///
/// # Example
///
/// ```toml
/// feature_store_dir = "features"
/// models_file = "models.json"
/// default_feature_store = "_DEFAULT_"
/// vector_format = "csv"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankConfig {
    /// Directory of `<store>.json` feature definitions
    #[serde(default = "default_feature_store_dir")]
    pub feature_store_dir: PathBuf,
    /// JSON file of model definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_file: Option<PathBuf>,
    /// Store used by models that do not name one
    #[serde(default = "default_store_name")]
    pub default_feature_store: String,
    /// Feature vector output format: `"csv"` or `"json"`
    #[serde(default)]
    pub vector_format: VectorFormat,
    /// Raw value used when a feature cannot be evaluated
    #[serde(default)]
    pub default_feature_value: f32,
    /// Minimum batch size scored in parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_feature_store_dir() -> PathBuf {
    PathBuf::from("features")
}

fn default_store_name() -> String {
    DEFAULT_STORE.to_string()
}

fn default_parallel_threshold() -> usize {
    64
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            feature_store_dir: default_feature_store_dir(),
            models_file: None,
            default_feature_store: default_store_name(),
            vector_format: VectorFormat::Csv,
            default_feature_value: 0.0,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl RerankConfig {
    /// Config rooted at a feature store directory, defaults elsewhere
    pub fn with_feature_store_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            feature_store_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Builder: models file
    pub fn with_models_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.models_file = Some(path.into());
        self
    }

    /// Check values that parse but make no sense
    ///
    /// # Errors
    ///
    /// - `parallel_threshold` of 0
    /// - non-finite `default_feature_value`
    /// - `default_feature_store` that is not a valid identifier
    pub fn validate(&self) -> LtrResult<()> {
        if self.parallel_threshold == 0 {
            return Err(LtrError::config("parallel_threshold must be at least 1"));
        }
        if !self.default_feature_value.is_finite() {
            return Err(LtrError::config("default_feature_value must be finite"));
        }
        NameValidator::validate(&self.default_feature_store).map_err(|e| {
            LtrError::config(format!(
                "invalid default_feature_store '{}': {}",
                self.default_feature_store, e
            ))
        })
    }

    /// Make relative paths relative to `base` instead of the working directory
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.feature_store_dir.is_relative() {
            self.feature_store_dir = base.join(&self.feature_store_dir);
        }
        if let Some(models) = self.models_file.as_mut() {
            if models.is_relative() {
                *models = base.join(&*models);
            }
        }
        self
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# ltrank configuration
#
# Directory of feature store definitions. Each <store>.json file is one
# store, named after the file.
feature_store_dir = "features"

# JSON array of model definitions (optional).
# models_file = "models.json"

# Store used by models that do not name one.
default_feature_store = "_DEFAULT_"

# Feature vector format: "csv" (@model:score;name:value) or "json"
vector_format = "csv"

# Raw value used when a feature cannot be evaluated and has no "default".
default_feature_value = 0.0

# Batches at least this large are scored in parallel.
parallel_threshold = 64
"#
    }

    /// Read and parse config from a file path.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> LtrResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LtrError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: RerankConfig = toml::from_str(&content).map_err(|e| {
            LtrError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        // Validate eagerly
        config.validate()?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        debug!(target: "ltr::config", path = %path.display(), "Loaded configuration");
        Ok(config.resolve_paths(base))
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> LtrResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                LtrError::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            debug!(target: "ltr::config", path = %path.display(), "Wrote default configuration");
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> LtrResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LtrError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            LtrError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
