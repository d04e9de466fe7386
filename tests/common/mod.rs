//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use ltrank::{RerankConfig, RerankDoc, CONFIG_FILE_NAME};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Definitions
// ============================================================================

/// Feature definitions for the `products` store
pub fn products_features() -> serde_json::Value {
    json!({
        "version": 1.0,
        "features": [
            {"name": "popularity", "type": "FieldValue", "params": {"field": "popularity"},
             "norm": {"type": "MinMax", "params": {"min": 0, "max": 10}}},
            {"name": "inStock", "type": "FieldValue", "params": {"field": "in_stock"}},
            {"name": "titleLength", "type": "FieldLength", "params": {"field": "title"}},
            {"name": "originalScore", "type": "OriginalScore"},
            {"name": "userAge", "type": "Value", "params": {"value": "${user_age}"}, "default": -1},
            {"name": "broken", "type": "NoSuchKind"}
        ]
    })
}

/// Model definitions over the `products` store
pub fn products_models() -> serde_json::Value {
    json!([
        {
            "name": "products_v1",
            "type": "Linear",
            "store": "products",
            "features": [{"name": "originalScore"}, {"name": "popularity"}, {"name": "inStock"}],
            "params": {"weights": {"originalScore": 1.0, "popularity": 4.0, "inStock": 2.0}}
        },
        {
            "name": "flat",
            "type": "Constant",
            "store": "products",
            "params": {"value": 1.0}
        },
        {
            "name": "missingWeights",
            "type": "Linear",
            "store": "products",
            "features": [{"name": "popularity"}]
        }
    ])
}

// ============================================================================
// Engine directories
// ============================================================================

/// A temp directory holding `ltr.toml`, `features/` and `models.json`
pub struct EngineDir {
    pub dir: TempDir,
}

impl EngineDir {
    /// Create with the products store and models
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let features = dir.path().join("features");
        fs::create_dir(&features).unwrap();
        write_json(&features.join("products.json"), &products_features());
        write_json(&dir.path().join("models.json"), &products_models());

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config_path,
            "feature_store_dir = \"features\"\nmodels_file = \"models.json\"\nparallel_threshold = 8\n",
        )
        .unwrap();
        EngineDir { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(CONFIG_FILE_NAME)
    }

    pub fn config(&self) -> RerankConfig {
        RerankConfig::from_file(&self.config_path()).unwrap()
    }

    pub fn write_models(&self, models: &serde_json::Value) {
        write_json(&self.dir.path().join("models.json"), models);
    }

    pub fn write_store(&self, name: &str, features: &serde_json::Value) {
        write_json(&self.dir.path().join("features").join(format!("{}.json", name)), features);
    }
}

pub fn write_json(path: &Path, value: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

// ============================================================================
// Documents
// ============================================================================

/// `count` documents with varying popularity, stock and first-pass score
pub fn product_docs(count: usize) -> Vec<RerankDoc> {
    (0..count)
        .map(|i| {
            RerankDoc::new(format!("p{}", i))
                .with_score((count - i) as f32 / count as f32)
                .with_field("popularity", (i % 11) as f64)
                .with_field("in_stock", if i % 3 == 0 { "T" } else { "F" })
                .with_field("title", "red running shoes")
        })
        .collect()
}
