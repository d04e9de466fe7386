//! Evaluation contexts
//!
//! - `RerankDoc`: the candidate document handed over by the collector
//! - `ScoringContext`: request-scoped, read-only state shared by every worker
//!   (external feature info, cancellation signal, deadline)
//! - `DocContext`: the short-lived per-document view features evaluate
//!   against; it borrows both and is dropped once the document is scored

use ltrank_core::{LtrError, LtrResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// RerankDoc
// ============================================================================

/// A stored field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Numeric field
    Number(f64),
    /// Boolean field
    Bool(bool),
    /// Text field
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// A candidate document from the first-pass ranking
#[derive(Debug, Clone)]
pub struct RerankDoc {
    /// Document identifier
    pub id: String,
    /// First-pass score
    pub original_score: f32,
    /// Stored fields available to features
    pub fields: HashMap<String, FieldValue>,
}

impl RerankDoc {
    /// Create a document with no fields and a zero first-pass score
    pub fn new(id: impl Into<String>) -> Self {
        RerankDoc {
            id: id.into(),
            original_score: 0.0,
            fields: HashMap::new(),
        }
    }

    /// Builder: set first-pass score
    pub fn with_score(mut self, score: f32) -> Self {
        self.original_score = score;
        self
    }

    /// Builder: add a stored field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

// ============================================================================
// CancellationToken
// ============================================================================

/// Cooperative cancellation signal shared between a request and its workers
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// New, not-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once `cancel` has been called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ============================================================================
// ScoringContext
// ============================================================================

/// Request-scoped context for feature evaluation
///
/// Built once per query and shared read-only by all workers.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    efi: HashMap<String, String>,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl ScoringContext {
    /// Empty context: no external info, never cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add one external feature info entry
    pub fn with_efi(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.efi.insert(key.into(), value.into());
        self
    }

    /// Builder: replace external feature info
    pub fn with_external_info(mut self, efi: HashMap<String, String>) -> Self {
        self.efi = efi;
        self
    }

    /// Builder: attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Builder: absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Builder: deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// External feature info (request-supplied values for macro expansion)
    pub fn efi(&self) -> &HashMap<String, String> {
        &self.efi
    }

    /// The cancellation token
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Fails with [`LtrError::Cancelled`] once cancelled or past the deadline
    pub fn check(&self) -> LtrResult<()> {
        if self.cancellation.is_cancelled() {
            return Err(LtrError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(LtrError::Cancelled);
            }
        }
        Ok(())
    }

    /// Per-document view
    pub fn doc<'a>(&'a self, doc: &'a RerankDoc) -> DocContext<'a> {
        DocContext { request: self, doc }
    }
}

// ============================================================================
// DocContext
// ============================================================================

/// Per-document evaluation context
#[derive(Debug, Clone, Copy)]
pub struct DocContext<'a> {
    request: &'a ScoringContext,
    doc: &'a RerankDoc,
}

impl<'a> DocContext<'a> {
    /// The document being scored
    pub fn doc(&self) -> &'a RerankDoc {
        self.doc
    }

    /// The enclosing request
    pub fn request(&self) -> &'a ScoringContext {
        self.request
    }

    /// Stored field lookup
    pub fn field(&self, name: &str) -> Option<&'a FieldValue> {
        self.doc.fields.get(name)
    }

    /// First-pass score
    pub fn original_score(&self) -> f32 {
        self.doc.original_score
    }

    /// External feature info lookup
    pub fn efi(&self, key: &str) -> Option<&'a str> {
        self.request.efi.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_builder() {
        let doc = RerankDoc::new("d1")
            .with_score(2.5)
            .with_field("popularity", 3.0)
            .with_field("title", "hello world")
            .with_field("premium", true);
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.original_score, 2.5);
        assert_eq!(doc.fields.get("popularity"), Some(&FieldValue::Number(3.0)));
        assert_eq!(doc.fields.get("premium"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_doc_context_lookups() {
        let ctx = ScoringContext::new().with_efi("user", "42");
        let doc = RerankDoc::new("d").with_score(1.5).with_field("f", 1i64);
        let dctx = ctx.doc(&doc);
        assert_eq!(dctx.efi("user"), Some("42"));
        assert_eq!(dctx.efi("missing"), None);
        assert_eq!(dctx.field("f"), Some(&FieldValue::Number(1.0)));
        assert_eq!(dctx.original_score(), 1.5);
    }

    #[test]
    fn test_cancellation_visible_through_clones() {
        let token = CancellationToken::new();
        let ctx = ScoringContext::new().with_cancellation(token.clone());
        assert!(ctx.check().is_ok());
        token.cancel();
        assert!(matches!(ctx.check(), Err(LtrError::Cancelled)));
    }

    #[test]
    fn test_deadline_elapsed() {
        let ctx = ScoringContext::new().with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(ctx.check().unwrap_err().is_cancelled());
        let ctx = ScoringContext::new().with_timeout(Duration::from_secs(3600));
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn test_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScoringContext>();
        assert_send_sync::<RerankDoc>();
    }
}
