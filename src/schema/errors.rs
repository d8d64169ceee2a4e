//! Schema error types.

use std::fmt;
use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Structural problems with a schema itself (not with a payload).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A name in `required` has no matching entry in `properties`.
    #[error("required field '{0}' is not declared in properties")]
    UndeclaredRequired(String),

    /// A declared `pattern` constraint is not a valid regular expression.
    #[error("field '{field}' declares an invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },
}

/// One payload violation: the offending field and the constraint it
/// violated. Validation returns the complete list so callers can
/// report all problems at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the offending payload field.
    pub field: String,
    /// Name of the violated constraint (e.g. "required", "type",
    /// "minLength", "pattern").
    pub constraint: String,
    /// Human-readable detail, enough to correct the input.
    pub detail: String,
}

impl Violation {
    pub fn new(
        field: impl Into<String>,
        constraint: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
            detail: detail.into(),
        }
    }

    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::new(field, "required", "field must be present and non-null")
    }

    pub fn null_required(field: impl Into<String>) -> Self {
        Self::new(field, "required", "field is null")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::new(field, "type", format!("expected {expected}, got {actual}"))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}' [{}]: {}",
            self.field, self.constraint, self.detail
        )
    }
}

/// Render a violation list for error messages.
pub fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display_names_field_and_constraint() {
        let v = Violation::type_mismatch("age", "integer", "string");
        let s = v.to_string();
        assert!(s.contains("age"));
        assert!(s.contains("type"));
        assert!(s.contains("integer"));
    }

    #[test]
    fn test_join_violations() {
        let vs = vec![
            Violation::missing_required("name"),
            Violation::type_mismatch("age", "integer", "string"),
        ];
        let joined = join_violations(&vs);
        assert!(joined.contains("name"));
        assert!(joined.contains("age"));
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::UndeclaredRequired("customerCode".into());
        assert!(err.to_string().contains("customerCode"));
    }
}
