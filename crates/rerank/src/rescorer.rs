//! Second-pass rescoring
//!
//! Per document: evaluate features, normalize, assemble the model vector
//! in model order, score. The per-document [`DocContext`] lives only for
//! the duration of that document; nothing is written to shared state, so
//! documents are scored in parallel once a batch reaches the parallel
//! threshold.
//!
//! The cancellation signal is checked before each document. A cancelled
//! batch returns [`LtrError::Cancelled`] and no partial results.

use crate::model::ScoringModel;
use crate::vector::{FeatureVector, VectorFormat};
use ltrank_core::{Explanation, LtrError, LtrResult};
use ltrank_features::{RerankDoc, ScoringContext};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Default minimum batch size for parallel scoring
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// A document with its second-pass score
#[derive(Debug, Clone)]
pub struct ScoredDoc {
    /// The document
    pub doc: RerankDoc,
    /// Model score, or the first-pass score for documents past `top_n`
    pub score: f32,
}

/// Scores documents with one model
#[derive(Debug, Clone)]
pub struct Rescorer {
    model: Arc<dyn ScoringModel>,
    parallel_threshold: usize,
    format: VectorFormat,
}

impl Rescorer {
    /// Create a rescorer for a model
    pub fn new(model: Arc<dyn ScoringModel>) -> Self {
        Rescorer {
            model,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            format: VectorFormat::Csv,
        }
    }

    /// Builder: minimum batch size scored in parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    /// Builder: format used by [`Rescorer::render_vector`]
    pub fn with_vector_format(mut self, format: VectorFormat) -> Self {
        self.format = format;
        self
    }

    /// The bound model
    pub fn model(&self) -> &Arc<dyn ScoringModel> {
        &self.model
    }

    /// Score one document
    pub fn score_document(&self, ctx: &ScoringContext, doc: &RerankDoc) -> LtrResult<f32> {
        ctx.check()?;
        Ok(self.score_unchecked(ctx, doc))
    }

    /// Normalized values of every reported feature, in `all_features` order
    pub fn feature_values(&self, ctx: &ScoringContext, doc: &RerankDoc) -> LtrResult<Vec<f32>> {
        ctx.check()?;
        let dctx = ctx.doc(doc);
        Ok(self
            .model
            .meta()
            .all_features()
            .iter()
            .map(|mf| mf.value(&dctx))
            .collect())
    }

    /// Score plus every reported feature value
    pub fn feature_vector(&self, ctx: &ScoringContext, doc: &RerankDoc) -> LtrResult<FeatureVector> {
        ctx.check()?;
        Ok(self.vector_unchecked(ctx, doc))
    }

    /// Feature vector in the configured format
    pub fn render_vector(&self, ctx: &ScoringContext, doc: &RerankDoc) -> LtrResult<String> {
        Ok(self.feature_vector(ctx, doc)?.render(self.format))
    }

    /// Explanation tree for one document
    ///
    /// Each reported feature contributes a normalization node wrapping its
    /// raw explanation; the model composes those into the final node.
    pub fn explain_document(&self, ctx: &ScoringContext, doc: &RerankDoc) -> LtrResult<Explanation> {
        ctx.check()?;
        let dctx = ctx.doc(doc);
        let meta = self.model.meta();
        let features: Vec<Explanation> = meta
            .all_features()
            .iter()
            .map(|mf| mf.explain(&dctx))
            .collect();
        let vector: Vec<f32> = meta.select(&features).map(Explanation::value).collect();
        let score = self.model.score(&vector);
        Ok(self.model.explain(&dctx, score, &features))
    }

    /// Rescore the first `top_n` documents and sort them by score
    ///
    /// Ties keep their input order and NaN scores sort after every number.
    /// Documents past `top_n` follow in input order with their first-pass
    /// score.
    pub fn rerank(
        &self,
        ctx: &ScoringContext,
        docs: Vec<RerankDoc>,
        top_n: usize,
    ) -> LtrResult<Vec<ScoredDoc>> {
        let top_n = top_n.min(docs.len());
        let scores = self.map_docs(ctx, &docs[..top_n], |doc| self.score_unchecked(ctx, doc))?;

        let mut docs = docs;
        let tail = docs.split_off(top_n);
        let mut scored: Vec<ScoredDoc> = docs
            .into_iter()
            .zip(scores)
            .map(|(doc, score)| ScoredDoc { doc, score })
            .collect();
        scored.sort_by(|a, b| descending_nan_last(a.score, b.score));
        scored.extend(tail.into_iter().map(|doc| ScoredDoc {
            score: doc.original_score,
            doc,
        }));

        debug!(
            target: "ltr::rescore",
            model = %self.model.name(),
            rescored = top_n,
            total = scored.len(),
            "Reranked batch"
        );
        Ok(scored)
    }

    /// Feature vectors for a batch, in input order
    pub fn feature_vectors(&self, ctx: &ScoringContext, docs: &[RerankDoc]) -> LtrResult<Vec<FeatureVector>> {
        self.map_docs(ctx, docs, |doc| self.vector_unchecked(ctx, doc))
    }

    fn score_unchecked(&self, ctx: &ScoringContext, doc: &RerankDoc) -> f32 {
        let dctx = ctx.doc(doc);
        let vector: Vec<f32> = self.model.meta().features().map(|mf| mf.value(&dctx)).collect();
        self.model.score(&vector)
    }

    fn vector_unchecked(&self, ctx: &ScoringContext, doc: &RerankDoc) -> FeatureVector {
        let dctx = ctx.doc(doc);
        let meta = self.model.meta();
        let all: Vec<f32> = meta.all_features().iter().map(|mf| mf.value(&dctx)).collect();
        let vector: Vec<f32> = meta.select(&all).copied().collect();
        let score = self.model.score(&vector);
        let values = meta
            .all_features()
            .iter()
            .zip(all)
            .map(|(mf, v)| (mf.name().to_string(), v))
            .collect();
        FeatureVector::new(self.model.name(), score, values)
    }

    fn map_docs<T, F>(&self, ctx: &ScoringContext, docs: &[RerankDoc], f: F) -> LtrResult<Vec<T>>
    where
        T: Send,
        F: Fn(&RerankDoc) -> T + Sync,
    {
        let run = |doc: &RerankDoc| -> LtrResult<T> {
            ctx.check()?;
            Ok(f(doc))
        };
        let result: LtrResult<Vec<T>> = if docs.len() >= self.parallel_threshold {
            docs.par_iter().map(run).collect()
        } else {
            docs.iter().map(run).collect()
        };
        if let Err(LtrError::Cancelled) = &result {
            info!(
                target: "ltr::rescore",
                model = %self.model.name(),
                docs = docs.len(),
                "Rescoring cancelled, discarding batch"
            );
        }
        result
    }
}

fn descending_nan_last(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearModel;
    use crate::model::{ModelFeature, ModelMeta};
    use ltrank_core::NamedParams;
    use ltrank_features::{CancellationToken, FeatureLoader, FeatureRegistry, NormalizerRegistry};
    use serde_json::json;

    fn linear() -> Arc<dyn ScoringModel> {
        let f = FeatureRegistry::with_defaults();
        let n = NormalizerRegistry::with_defaults();
        let store = Arc::new(
            FeatureLoader::new(&f, &n)
                .load(
                    "s",
                    &json!([
                        {"name": "pop", "type": "FieldValue", "params": {"field": "pop"},
                         "norm": {"type": "MinMax", "params": {"min": 0, "max": 10}}},
                        {"name": "orig", "type": "OriginalScore"},
                        {"name": "unused", "type": "Value", "params": {"value": 7}},
                    ]),
                )
                .store,
        );
        let features = vec![
            ModelFeature::new(Arc::clone(store.get("orig").unwrap())),
            ModelFeature::new(Arc::clone(store.get("pop").unwrap())),
        ];
        let params = NamedParams::from_json(&json!({"weights": {"orig": 1.0, "pop": 10.0}})).unwrap();
        let meta = ModelMeta::new("lin", "Linear", store, features, params).unwrap();
        Arc::new(LinearModel::new(meta).unwrap())
    }

    fn doc(id: &str, pop: f64, orig: f32) -> RerankDoc {
        RerankDoc::new(id).with_field("pop", pop).with_score(orig)
    }

    #[test]
    fn test_score_document() {
        let r = Rescorer::new(linear());
        let ctx = ScoringContext::new();
        // orig 2 + 10 * (5 / 10)
        assert_eq!(r.score_document(&ctx, &doc("d", 5.0, 2.0)).unwrap(), 7.0);
    }

    #[test]
    fn test_feature_vector_reports_all_features_in_store_order() {
        let r = Rescorer::new(linear());
        let ctx = ScoringContext::new();
        let v = r.feature_vector(&ctx, &doc("d", 5.0, 2.0)).unwrap();
        assert_eq!(v.to_csv(), "@lin:7.0;pop:0.5;orig:2.0;unused:7.0");
        assert_eq!(
            r.feature_values(&ctx, &doc("d", 5.0, 2.0)).unwrap(),
            vec![0.5, 2.0, 7.0]
        );
        let json = Rescorer::new(linear())
            .with_vector_format(VectorFormat::Json)
            .render_vector(&ctx, &doc("d", 5.0, 2.0))
            .unwrap();
        assert_eq!(json, r#"{"@lin":7.0,"pop":0.5,"orig":2.0,"unused":7.0}"#);
    }

    #[test]
    fn test_explain_matches_score() {
        let r = Rescorer::new(linear());
        let ctx = ScoringContext::new();
        let d = doc("d", 5.0, 2.0);
        let e = r.explain_document(&ctx, &d).unwrap();
        assert_eq!(e.value(), r.score_document(&ctx, &d).unwrap());
        // orig then pop, in model order
        let pop = &e.details()[1];
        assert_eq!(pop.value(), 5.0);
        let normalized = &pop.details()[1];
        assert_eq!(normalized.value(), 0.5);
        assert!(normalized.description().starts_with("normalized using MinMax"));
        assert_eq!(normalized.details()[0].value(), 5.0);
    }

    #[test]
    fn test_rerank_sorts_head_and_keeps_tail() {
        let r = Rescorer::new(linear());
        let ctx = ScoringContext::new();
        let docs = vec![
            doc("a", 1.0, 0.0),
            doc("b", 9.0, 0.0),
            doc("c", 1.0, 0.0),
            doc("tail1", 10.0, 3.0),
            doc("tail2", 10.0, 4.0),
        ];
        let out = r.rerank(&ctx, docs, 3).unwrap();
        let ids: Vec<&str> = out.iter().map(|s| s.doc.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "tail1", "tail2"]);
        assert_eq!(out[3].score, 3.0);
    }

    #[test]
    fn test_rerank_sorts_nan_scores_last() {
        let r = Rescorer::new(linear());
        let ctx = ScoringContext::new();
        let docs = vec![
            doc("nan", f64::NAN, 0.0),
            doc("a", 1.0, 0.0),
            doc("neg_nan", -f64::NAN, 0.0),
            doc("b", 9.0, 0.0),
            doc("low", 0.0, -5.0),
        ];
        let out = r.rerank(&ctx, docs, 5).unwrap();
        let ids: Vec<&str> = out.iter().map(|s| s.doc.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "low", "nan", "neg_nan"]);
        assert!(out[3].score.is_nan());
    }

    #[test]
    fn test_rerank_top_n_larger_than_batch() {
        let r = Rescorer::new(linear());
        let out = r.rerank(&ScoringContext::new(), vec![doc("a", 1.0, 0.0)], 10).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let docs: Vec<RerankDoc> = (0..200)
            .map(|i| doc(&format!("d{}", i), (i % 10) as f64, (i % 7) as f32))
            .collect();
        let ctx = ScoringContext::new();
        let sequential = Rescorer::new(linear())
            .with_parallel_threshold(usize::MAX)
            .rerank(&ctx, docs.clone(), 200)
            .unwrap();
        let parallel = Rescorer::new(linear())
            .with_parallel_threshold(1)
            .rerank(&ctx, docs, 200)
            .unwrap();
        let a: Vec<(&str, f32)> = sequential.iter().map(|s| (s.doc.id.as_str(), s.score)).collect();
        let b: Vec<(&str, f32)> = parallel.iter().map(|s| (s.doc.id.as_str(), s.score)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancelled_batch_returns_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = ScoringContext::new().with_cancellation(token);
        let r = Rescorer::new(linear());
        let docs = vec![doc("a", 1.0, 0.0), doc("b", 2.0, 0.0)];
        assert!(matches!(r.rerank(&ctx, docs.clone(), 2), Err(LtrError::Cancelled)));
        assert!(r.feature_vectors(&ctx, &docs).unwrap_err().is_cancelled());
        assert!(r.score_document(&ctx, &docs[0]).is_err());
        assert!(r.explain_document(&ctx, &docs[0]).is_err());
    }
}
