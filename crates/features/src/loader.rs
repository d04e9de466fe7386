//! FeatureLoader: JSON feature definitions into a FeatureStore
//!
//! Accepted top-level shapes:
//! - `[{name, type, params?, norm?, default?}, ...]`
//! - `{"version": 1.0, "features": [...]}`
//!
//! Entries are processed in order. A failing entry is logged with the raw
//! entry and the store name, recorded in the [`LoadReport`], and skipped;
//! it never aborts the load and never consumes an id. Any other top-level
//! shape loads nothing.

use crate::feature::{Feature, FeatureConfig, FeatureRegistry};
use crate::normalizer::{IdentityNormalizer, NormalizerConfig, NormalizerRegistry};
use crate::store::FeatureStore;
use ltrank_core::{LtrError, LtrResult, NameValidator, NamedParams};
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// A feature entry that did not make it into the store
#[derive(Debug)]
pub struct SkippedEntry {
    /// Position in the input sequence
    pub index: usize,
    /// The raw entry
    pub entry: JsonValue,
    /// Why it was skipped
    pub reason: LtrError,
}

/// Outcome of loading one feature configuration
#[derive(Debug)]
pub struct LoadReport {
    /// The populated store
    pub store: FeatureStore,
    /// Per-entry failures, in input order
    pub skipped: Vec<SkippedEntry>,
    /// Set when the top-level input had the wrong shape
    pub shape_error: Option<LtrError>,
}

impl LoadReport {
    fn empty(store_name: &str, shape_error: LtrError) -> Self {
        LoadReport {
            store: FeatureStore::new(store_name),
            skipped: Vec::new(),
            shape_error: Some(shape_error),
        }
    }

    /// Number of features loaded
    pub fn loaded(&self) -> usize {
        self.store.len()
    }

    /// True if every entry loaded and the input shape was valid
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.shape_error.is_none()
    }
}

/// Builds feature stores from declarative definitions
#[derive(Debug, Clone, Copy)]
pub struct FeatureLoader<'a> {
    features: &'a FeatureRegistry,
    normalizers: &'a NormalizerRegistry,
    default_value: f32,
}

impl<'a> FeatureLoader<'a> {
    /// Create a loader over the given registries
    pub fn new(features: &'a FeatureRegistry, normalizers: &'a NormalizerRegistry) -> Self {
        FeatureLoader {
            features,
            normalizers,
            default_value: 0.0,
        }
    }

    /// Builder: value used for entries without a `default`
    pub fn with_default_value(mut self, value: f32) -> Self {
        self.default_value = value;
        self
    }

    /// Load a parsed JSON document into a store named `store_name`
    pub fn load(&self, store_name: &str, input: &JsonValue) -> LoadReport {
        let (entries, version) = match split_top_level(input) {
            Ok(parts) => parts,
            Err(e) => {
                error!(target: "ltr::loader", store = %store_name, error = %e, "Nothing to load");
                return LoadReport::empty(store_name, e);
            }
        };

        let mut store = FeatureStore::new(store_name);
        store.set_version(version);
        let mut skipped = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            let outcome = parse_entry(entry)
                .and_then(|config| self.build(&config, store.len()))
                .and_then(|feature| store.add(feature));
            match outcome {
                Ok(feature) => {
                    debug!(
                        target: "ltr::loader",
                        store = %store_name,
                        feature = %feature.name(),
                        id = feature.id(),
                        "Loaded feature"
                    );
                }
                Err(reason) => {
                    warn!(
                        target: "ltr::loader",
                        store = %store_name,
                        index,
                        entry = %entry,
                        error = %reason,
                        "Skipping feature entry"
                    );
                    skipped.push(SkippedEntry {
                        index,
                        entry: entry.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            target: "ltr::loader",
            store = %store_name,
            loaded = store.len(),
            skipped = skipped.len(),
            "Loaded feature store"
        );

        LoadReport {
            store,
            skipped,
            shape_error: None,
        }
    }

    /// Load from JSON text; unparsable text loads nothing
    pub fn load_str(&self, store_name: &str, text: &str) -> LoadReport {
        match serde_json::from_str::<JsonValue>(text) {
            Ok(value) => self.load(store_name, &value),
            Err(e) => {
                let e = LtrError::shape(format!("unparsable JSON: {}", e));
                error!(target: "ltr::loader", store = %store_name, error = %e, "Nothing to load");
                LoadReport::empty(store_name, e)
            }
        }
    }

    /// Load a `<store>.json` file; the store is named after the file stem
    ///
    /// # Errors
    ///
    /// - [`LtrError::NameValidation`] if the stem is not a valid name
    /// - [`LtrError::Io`] if the file cannot be read
    pub fn load_file(&self, path: impl AsRef<Path>) -> LtrResult<LoadReport> {
        let path = path.as_ref();
        let store_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LtrError::config(format!("no store name in path {}", path.display())))?;
        NameValidator::require(store_name)?;
        let text = fs::read_to_string(path)?;
        Ok(self.load_str(store_name, &text))
    }

    /// Instantiate one feature with the given id
    pub fn build(&self, config: &FeatureConfig, id: usize) -> LtrResult<Feature> {
        NameValidator::require(&config.name)?;
        let scorer = self.features.create(&config.type_name, &config.params)?;
        let normalizer = match &config.norm {
            Some(norm) => self.normalizers.create(norm)?,
            None => IdentityNormalizer::shared(),
        };
        Ok(Feature::new(
            config.name.clone(),
            id,
            config.type_name.clone(),
            config.params.clone(),
            normalizer,
            config.default.unwrap_or(self.default_value),
            scorer,
        ))
    }
}

fn split_top_level(input: &JsonValue) -> LtrResult<(&[JsonValue], Option<f32>)> {
    match input {
        JsonValue::Array(entries) => Ok((entries.as_slice(), None)),
        JsonValue::Object(obj) => {
            let entries = match obj.get("features") {
                Some(JsonValue::Array(entries)) => entries.as_slice(),
                _ => return Err(LtrError::shape("object input needs a 'features' array")),
            };
            let version = match obj.get("version") {
                None | Some(JsonValue::Null) => None,
                Some(v) => Some(
                    v.as_f64()
                        .ok_or_else(|| LtrError::shape("'version' must be a number"))?
                        as f32,
                ),
            };
            Ok((entries, version))
        }
        other => Err(LtrError::shape(format!(
            "expected an array of features, got {}",
            json_kind(other)
        ))),
    }
}

/// Turn a raw entry into a [`FeatureConfig`], with typed errors
pub fn parse_entry(entry: &JsonValue) -> LtrResult<FeatureConfig> {
    let obj = entry
        .as_object()
        .ok_or_else(|| LtrError::feature("", format!("entry is {}, not an object", json_kind(entry))))?;

    let name = required_str(obj, "", "name")?;
    let type_name = required_str(obj, name, "type")?;

    let params = match obj.get("params") {
        None | Some(JsonValue::Null) => NamedParams::new(),
        Some(v) => NamedParams::from_json(v)?,
    };

    let norm = match obj.get("norm") {
        None | Some(JsonValue::Null) => None,
        Some(v) => {
            let norm_obj = v
                .as_object()
                .ok_or_else(|| LtrError::feature(name, "'norm' must be an object"))?;
            let norm_type = required_str(norm_obj, name, "type")?;
            let norm_params = match norm_obj.get("params") {
                None | Some(JsonValue::Null) => NamedParams::new(),
                Some(p) => NamedParams::from_json(p)?,
            };
            Some(NormalizerConfig::new(norm_type, norm_params))
        }
    };

    let default = match obj.get("default") {
        None | Some(JsonValue::Null) => None,
        Some(v) => Some(
            v.as_f64()
                .ok_or_else(|| LtrError::feature(name, "'default' must be a number"))?
                as f32,
        ),
    };

    Ok(FeatureConfig {
        name: name.to_string(),
        type_name: type_name.to_string(),
        params,
        norm,
        default,
    })
}

fn required_str<'v>(obj: &'v Map<String, JsonValue>, name: &str, key: &str) -> LtrResult<&'v str> {
    match obj.get(key) {
        Some(JsonValue::String(s)) => Ok(s.as_str()),
        Some(_) => Err(LtrError::feature(name, format!("'{}' must be a string", key))),
        None => Err(LtrError::feature(name, format!("missing '{}'", key))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
