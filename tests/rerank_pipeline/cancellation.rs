//! Cooperative cancellation and deadlines

use crate::common::*;
use ltrank::{
    CancellationToken, DocContext, FeatureRegistry, FeatureScorer, LtrError, LtrResult,
    ModelRegistry, NormalizerRegistry, RerankEngine, Rescorer, ScoringContext,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancels a token once it has been evaluated `after` times
#[derive(Debug)]
struct Tripwire {
    token: CancellationToken,
    seen: Arc<AtomicUsize>,
    after: usize,
}

impl FeatureScorer for Tripwire {
    fn score(&self, _ctx: &DocContext<'_>) -> LtrResult<Option<f32>> {
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
            self.token.cancel();
        }
        Ok(Some(1.0))
    }

    fn describe(&self) -> String {
        "Tripwire".to_string()
    }
}

fn tripwire_engine(token: &CancellationToken, seen: &Arc<AtomicUsize>) -> (EngineDir, RerankEngine) {
    let env = EngineDir::new();
    env.write_store(
        "trip",
        &json!([{"name": "wire", "type": "Tripwire", "params": {"after": 5}}]),
    );
    env.write_models(&json!([
        {"name": "tripped", "type": "Linear", "store": "trip",
         "features": [{"name": "wire"}], "params": {"weights": {"wire": 1.0}}}
    ]));

    let mut features = FeatureRegistry::with_defaults();
    let token = token.clone();
    let seen = Arc::clone(seen);
    features.register("Tripwire", move |params| {
        Ok(Box::new(Tripwire {
            token: token.clone(),
            seen: Arc::clone(&seen),
            after: params.get_float_or("after", 1.0) as usize,
        }) as Box<dyn FeatureScorer>)
    });
    let engine = RerankEngine::with_registries(
        env.config(),
        features,
        NormalizerRegistry::with_defaults(),
        ModelRegistry::with_defaults(),
    )
    .unwrap();
    (env, engine)
}

#[test]
fn test_cancel_mid_batch_discards_output() {
    let token = CancellationToken::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let (_env, engine) = tripwire_engine(&token, &seen);
    let rescorer = Rescorer::new(engine.models().require("tripped").unwrap())
        .with_parallel_threshold(usize::MAX);
    let ctx = ScoringContext::new().with_cancellation(token.clone());

    let result = rescorer.rerank(&ctx, product_docs(50), 50);
    assert!(matches!(result, Err(LtrError::Cancelled)));
    // documents after the trip are never evaluated
    assert_eq!(seen.load(Ordering::SeqCst), 5);
}

#[test]
fn test_cancelled_before_start_parallel() {
    let token = CancellationToken::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let (_env, engine) = tripwire_engine(&token, &seen);
    let rescorer = engine.rescorer("tripped").unwrap();
    token.cancel();

    let ctx = ScoringContext::new().with_cancellation(token);
    let docs = product_docs(64);
    assert!(rescorer.rerank(&ctx, docs.clone(), 64).unwrap_err().is_cancelled());
    assert!(rescorer.feature_vectors(&ctx, &docs).unwrap_err().is_cancelled());
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[test]
fn test_elapsed_deadline_cancels() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let rescorer = engine.rescorer("products_v1").unwrap();
    let ctx = ScoringContext::new().with_deadline(Instant::now() - Duration::from_millis(1));

    let doc = product_docs(1).remove(0);
    assert!(matches!(rescorer.score_document(&ctx, &doc), Err(LtrError::Cancelled)));
    assert!(matches!(rescorer.explain_document(&ctx, &doc), Err(LtrError::Cancelled)));
    assert!(matches!(rescorer.rerank(&ctx, product_docs(20), 20), Err(LtrError::Cancelled)));
}

#[test]
fn test_generous_deadline_completes() {
    let env = EngineDir::new();
    let engine = RerankEngine::open(env.config()).unwrap();
    let rescorer = engine.rescorer("products_v1").unwrap();
    let ctx = ScoringContext::new().with_timeout(Duration::from_secs(60));
    assert_eq!(rescorer.rerank(&ctx, product_docs(20), 20).unwrap().len(), 20);
}
