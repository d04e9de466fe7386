//! Core types for ltrank
//!
//! This crate defines the foundational types shared by the feature and
//! reranking crates:
//! - LtrError / LtrResult: error taxonomy for loading and scoring
//! - NamedParams / ParamValue: ordered, validated configuration params
//! - NameValidator: identifier predicate guarding the feature-vector format
//! - Explanation: value/description/children trees for explain output
//! - number: decimal float rendering used by every textual output

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod explain;
pub mod name;
pub mod number;
pub mod params;

pub use error::{LtrError, LtrResult};
pub use explain::Explanation;
pub use name::{NameError, NameValidator};
pub use number::{format_f32, format_f64};
pub use params::{NamedParams, ParamValue};
