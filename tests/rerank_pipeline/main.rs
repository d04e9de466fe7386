//! Rerank Pipeline Integration Tests
//!
//! End-to-end tests from `ltr.toml` through loading, scoring, explain,
//! feature logging, reload and cancellation.

#[path = "../common/mod.rs"]
mod common;

mod cancellation;
mod engine_lifecycle;
mod scoring;
