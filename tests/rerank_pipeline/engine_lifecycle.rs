//! Engine open / reload behavior

use crate::common::*;
use ltrank::{LtrError, RerankConfig, RerankDoc, RerankEngine, ScoringContext};
use serde_json::json;
use std::sync::Arc;
use std::thread;

#[test]
fn test_open_skips_bad_definitions() {
    let env = EngineDir::new();
    let engine = RerankEngine::open_path(&env.config_path()).unwrap();

    let store = engine.catalog().require("products").unwrap();
    assert_eq!(store.len(), 5);
    assert_eq!(store.version(), Some(1.0));
    assert!(store.get_by_name("broken").is_none());
    // ids stay contiguous
    for (i, feature) in store.features().enumerate() {
        assert_eq!(feature.id(), i);
    }

    assert_eq!(
        engine.models().names(),
        vec!["flat".to_string(), "products_v1".to_string()]
    );
    assert!(matches!(engine.rescorer("missingWeights"), Err(LtrError::Model(_))));
}

#[test]
fn test_reload_summary_counts() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let summary = engine.reload().unwrap();
    assert_eq!(summary.stores, vec!["products".to_string()]);
    assert_eq!(summary.skipped_features, 1);
    assert_eq!(summary.models.len(), 2);
    assert_eq!(summary.skipped_models, 1);
}

#[test]
fn test_reload_publishes_new_store_and_models_together() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let before = engine.snapshot();

    env.write_store(
        "articles",
        &json!([{"name": "freshness", "type": "FieldValue", "params": {"field": "age_days"}}]),
    );
    env.write_models(&json!([
        {"name": "articles_v1", "type": "Linear", "store": "articles",
         "features": [{"name": "freshness"}], "params": {"weights": {"freshness": -0.5}}}
    ]));
    engine.reload().unwrap();

    // The old snapshot is untouched
    assert!(before.catalog.get("articles").is_none());
    assert!(before.models.contains("products_v1"));

    let after = engine.snapshot();
    assert_eq!(after.catalog.names(), vec!["articles".to_string(), "products".to_string()]);
    assert_eq!(after.models.names(), vec!["articles_v1".to_string()]);

    let ctx = ScoringContext::new();
    let doc = RerankDoc::new("a").with_field("age_days", 4.0);
    let score = engine.rescorer("articles_v1").unwrap().score_document(&ctx, &doc).unwrap();
    assert_eq!(score, -2.0);
}

#[test]
fn test_failed_reload_keeps_current_snapshot() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    std::fs::write(env.path().join("models.json"), "{ not json").unwrap();
    assert!(engine.reload().is_err());
    assert!(engine.models().contains("products_v1"));
}

#[test]
fn test_reload_while_scoring() {
    let env = EngineDir::new();
    let engine = Arc::new(RerankEngine::open(env.config()).unwrap());
    let docs = product_docs(32);

    let scorers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let docs = docs.clone();
            thread::spawn(move || {
                let ctx = ScoringContext::new();
                for _ in 0..20 {
                    let rescorer = engine.rescorer("products_v1").unwrap();
                    let out = rescorer.rerank(&ctx, docs.clone(), docs.len()).unwrap();
                    assert_eq!(out.len(), docs.len());
                }
            })
        })
        .collect();

    for _ in 0..10 {
        engine.reload().unwrap();
    }
    for scorer in scorers {
        scorer.join().unwrap();
    }
}

#[test]
fn test_missing_models_file_is_an_error() {
    let env = EngineDir::new();
    let config = RerankConfig::with_feature_store_dir(env.path().join("features"))
        .with_models_file(env.path().join("nope.json"));
    assert!(matches!(RerankEngine::open(config), Err(LtrError::Io(_))));
}

#[test]
fn test_invalid_store_file_name_is_skipped_at_load() {
    let env = EngineDir::new();
    env.write_store(
        "products-v2",
        &json!([{"name": "freshness", "type": "FieldValue", "params": {"field": "age_days"}}]),
    );
    let engine = RerankEngine::open(env.config()).unwrap();

    assert_eq!(engine.catalog().names(), vec!["products".to_string()]);
    assert!(matches!(
        engine.logging_rescorer("products-v2"),
        Err(LtrError::StoreNotFound(_))
    ));
    // Every published store can serve a logging pass
    for name in engine.catalog().names() {
        assert!(engine.logging_rescorer(&name).is_ok());
    }
}
