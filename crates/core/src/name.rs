//! Identifier validation
//!
//! Feature names and param keys end up inside the feature-vector text format
//! (`@model:score;name:value;...`), so they must never contain the delimiter
//! characters or anything that could be confused with a number separator.
//!
//! ## Validation Rules
//!
//! - Characters: `[a-zA-Z0-9_()]`
//! - Must contain at least one ASCII letter or digit
//!
//! Valid names: `"test"`, `"test_test"`, `"328195082960784"`, `"test()"`
//!
//! Invalid names: `""`, `"    "`, `"test?"`, `"_____-----"`, `"12345,67890.31"`

use crate::error::{LtrError, LtrResult};
use std::fmt;

/// Error when validating an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty
    Empty,
    /// Name consists only of whitespace
    Blank,
    /// Name contains a character outside `[a-zA-Z0-9_()]`
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position of the invalid character
        position: usize,
    },
    /// Name has no letter or digit (e.g. only underscores or parentheses)
    NoAlphanumeric,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "name cannot be empty"),
            NameError::Blank => write!(f, "name cannot be only whitespace"),
            NameError::InvalidChar { char, position } => write!(
                f,
                "invalid character '{}' at position {} (only letters, digits, underscore and parentheses allowed)",
                char, position
            ),
            NameError::NoAlphanumeric => {
                write!(f, "name must contain at least one letter or digit")
            }
        }
    }
}

impl std::error::Error for NameError {}

/// Predicate over identifier strings (feature names, param keys)
#[derive(Debug, Clone, Copy, Default)]
pub struct NameValidator;

impl NameValidator {
    /// Returns true if `name` is an acceptable identifier
    pub fn check(name: &str) -> bool {
        Self::validate(name).is_ok()
    }

    /// Validate a name, returning the first rule it breaks
    pub fn validate(name: &str) -> Result<(), NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }

        if name.chars().all(char::is_whitespace) {
            return Err(NameError::Blank);
        }

        for (pos, ch) in name.chars().enumerate() {
            if !Self::is_valid_char(ch) {
                return Err(NameError::InvalidChar {
                    char: ch,
                    position: pos,
                });
            }
        }

        if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(NameError::NoAlphanumeric);
        }

        Ok(())
    }

    /// Validate a name, wrapping the failure into an [`LtrError`]
    pub fn require(name: &str) -> LtrResult<()> {
        Self::validate(name).map_err(|source| LtrError::NameValidation {
            name: name.to_string(),
            source,
        })
    }

    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '(' || c == ')'
    }
}

// ============================================================================
// Tests
// ============================================================================
