//! Scoring, explain and feature logging through a loaded engine

use crate::common::*;
use ltrank::{FeatureVector, RerankEngine, Rescorer, ScoringContext, VectorFormat};

#[test]
fn test_rerank_orders_by_model_score() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let rescorer = engine.rescorer("products_v1").unwrap();
    let ctx = ScoringContext::new();

    // original + 4 * popularity/10 + 2 * in_stock
    let out = rescorer.rerank(&ctx, product_docs(4), 4).unwrap();
    let ids: Vec<&str> = out.iter().map(|s| s.doc.id.as_str()).collect();
    assert_eq!(ids, vec!["p3", "p0", "p2", "p1"]);
    assert!((out[1].score - 3.0).abs() < 1e-6);
}

#[test]
fn test_rerank_tail_keeps_first_pass_order() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let rescorer = engine.rescorer("products_v1").unwrap();
    let ctx = ScoringContext::new();

    let docs = product_docs(6);
    let out = rescorer.rerank(&ctx, docs.clone(), 2).unwrap();
    let tail: Vec<&str> = out[2..].iter().map(|s| s.doc.id.as_str()).collect();
    assert_eq!(tail, vec!["p2", "p3", "p4", "p5"]);
    for (scored, doc) in out[2..].iter().zip(&docs[2..]) {
        assert_eq!(scored.score, doc.original_score);
    }
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    assert_eq!(engine.config().parallel_threshold, 8);

    let parallel = engine.rescorer("products_v1").unwrap();
    let sequential = Rescorer::new(engine.models().require("products_v1").unwrap())
        .with_parallel_threshold(usize::MAX);
    let ctx = ScoringContext::new().with_efi("user_age", "40");
    let docs = product_docs(100);

    let a = parallel.rerank(&ctx, docs.clone(), docs.len()).unwrap();
    let b = sequential.rerank(&ctx, docs.clone(), docs.len()).unwrap();
    let a: Vec<(&str, f32)> = a.iter().map(|s| (s.doc.id.as_str(), s.score)).collect();
    let b: Vec<(&str, f32)> = b.iter().map(|s| (s.doc.id.as_str(), s.score)).collect();
    assert_eq!(a, b);

    let va = parallel.feature_vectors(&ctx, &docs).unwrap();
    let vb = sequential.feature_vectors(&ctx, &docs).unwrap();
    assert_eq!(va, vb);
}

#[test]
fn test_logging_vector_uses_store_order_and_efi() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let logging = engine.logging_rescorer("products").unwrap();
    let doc = product_docs(4).remove(3);

    let ctx = ScoringContext::new().with_efi("user_age", "33");
    assert_eq!(
        logging.render_vector(&ctx, &doc).unwrap(),
        "@products:0.0;popularity:0.3;inStock:1.0;titleLength:3.0;originalScore:0.25;userAge:33.0"
    );

    // Missing macro falls back to the feature default
    let vector = logging.feature_vector(&ScoringContext::new(), &doc).unwrap();
    assert_eq!(vector.get("userAge"), Some(-1.0));
}

#[test]
fn test_model_vector_reports_every_store_feature() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let rescorer = engine.rescorer("products_v1").unwrap();
    let ctx = ScoringContext::new();
    let doc = product_docs(4).remove(0);

    let vector = rescorer.feature_vector(&ctx, &doc).unwrap();
    assert_eq!(vector.model(), "products_v1");
    assert_eq!(vector.score(), rescorer.score_document(&ctx, &doc).unwrap());
    let names: Vec<&str> = vector.values().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec!["popularity", "inStock", "titleLength", "originalScore", "userAge"]
    );
    assert_eq!(FeatureVector::parse(&vector.to_csv()).unwrap(), vector);
}

#[test]
fn test_json_vector_format() {
    let env = EngineDir::new();
    let mut config = env.config();
    config.vector_format = VectorFormat::Json;
    let engine = RerankEngine::open(config).unwrap();
    let flat = engine.rescorer("flat").unwrap();
    let doc = product_docs(1).remove(0);

    let rendered = flat.render_vector(&ScoringContext::new(), &doc).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["@flat"], 1.0);
    assert_eq!(value["titleLength"], 3.0);
}

#[test]
fn test_explain_matches_score() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let rescorer = engine.rescorer("products_v1").unwrap();
    let ctx = ScoringContext::new();

    for doc in product_docs(10) {
        let score = rescorer.score_document(&ctx, &doc).unwrap();
        let explain = rescorer.explain_document(&ctx, &doc).unwrap();
        assert!((explain.value() - score).abs() < 1e-6);
        // one product node per weighted feature
        assert_eq!(explain.details().len(), 3);
        for prod in explain.details() {
            assert_eq!(prod.description(), "prod of:");
            assert_eq!(prod.details().len(), 2);
        }
    }
}

mod properties {
    use crate::common::*;
    use ltrank::{RerankEngine, ScoringContext};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn rerank_is_a_sorted_permutation(count in 1usize..40, top_n in 0usize..50) {
            let env = EngineDir::new();
            let engine = RerankEngine::open(env.config()).unwrap();
            let rescorer = engine.rescorer("products_v1").unwrap();
            let docs = product_docs(count);

            let out = rescorer.rerank(&ScoringContext::new(), docs.clone(), top_n).unwrap();
            prop_assert_eq!(out.len(), docs.len());

            let mut ids: Vec<&str> = out.iter().map(|s| s.doc.id.as_str()).collect();
            ids.sort_unstable();
            let mut expected: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
            expected.sort_unstable();
            prop_assert_eq!(ids, expected);

            let head = top_n.min(count);
            for pair in out[..head].windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
