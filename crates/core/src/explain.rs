//! Explanation trees
//!
//! An `Explanation` pairs a value with a human-readable description and an
//! ordered list of child explanations. Trees are built fresh for every
//! explain call and never shared between documents.

use crate::number::format_f32;
use serde::Serialize;
use std::fmt;

/// A node in an explanation tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    value: f32,
    description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<Explanation>,
}

impl Explanation {
    /// Create a leaf node
    pub fn new(value: f32, description: impl Into<String>) -> Self {
        Explanation {
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// Create a node with children
    pub fn with_details(value: f32, description: impl Into<String>, details: Vec<Explanation>) -> Self {
        Explanation {
            value,
            description: description.into(),
            details,
        }
    }

    /// Append a child
    pub fn add_detail(&mut self, detail: Explanation) {
        self.details.push(detail);
    }

    /// The value this node justifies
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Children in order
    pub fn details(&self) -> &[Explanation] {
        &self.details
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            write!(f, "  ")?;
        }
        writeln!(f, "{} = {}", format_f32(self.value), self.description)?;
        for detail in &self.details {
            detail.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
