//! Error types for design registration and validation.

use thiserror::Error;

/// Errors surfaced when a design build finishes.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// One or more builder invocations were structurally invalid.
    #[error("design registration failed:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Structural(Vec<StructuralError>),
}

/// A single registration-time problem, qualified by the node path at which
/// the offending builder ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct StructuralError {
    /// Path of builder frames, e.g. `group 'congo' > store 'mysql'`.
    pub path: String,
    /// What went wrong.
    pub message: String,
}

/// A single invariant violation found by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{node}: {message}")]
pub struct ValidationError {
    /// Path identifying the offending node.
    pub node: String,
    /// What invariant was violated.
    pub message: String,
}

/// Aggregate of every invariant violation in a tree.
///
/// Validation is not fail-fast: every node is visited exactly once and all
/// violations are collected in visit order.
#[derive(Debug, Default, Error)]
#[error("{} validation error(s):\n{}", .errors.len(), .errors.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation at `node`.
    pub fn add(&mut self, node: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError {
            node: node.into(),
            message: message.into(),
        });
    }

    /// Absorbs all violations from `other`, preserving order.
    pub fn merge(&mut self, mut other: Self) {
        self.errors.append(&mut other.errors);
    }

    /// Returns whether no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of violations recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The recorded violations, in visit order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Converts to `Err(self)` when any violation was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when non-empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_preserves_order() {
        let mut a = ValidationErrors::new();
        a.add("model 'User'", "name not defined");
        let mut b = ValidationErrors::new();
        b.add("field 'email'", "missing model parent");
        a.merge(b);

        assert_eq!(a.len(), 2);
        assert_eq!(a.errors()[0].node, "model 'User'");
        assert_eq!(a.errors()[1].node, "field 'email'");
    }

    #[test]
    fn empty_converts_to_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn display_lists_every_entry() {
        let mut verr = ValidationErrors::new();
        verr.add("a", "x");
        verr.add("b", "y");
        let rendered = verr.to_string();

        assert!(rendered.contains("2 validation error(s)"));
        assert!(rendered.contains("a: x"));
        assert!(rendered.contains("b: y"));
    }
}
