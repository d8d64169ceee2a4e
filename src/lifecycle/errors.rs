//! Lifecycle error types.

use thiserror::Error;
use uuid::Uuid;

use crate::definition::DefinitionError;
use crate::schema::{join_violations, Violation};
use crate::store::StoreError;
use crate::versioning::VersioningError;

/// Result type for record lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors raised by the record lifecycle manager.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Definition lookup or configuration failure.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// No record revision with this id.
    #[error("record {0} not found")]
    RecordNotFound(Uuid),

    /// The definition's usability gate is off; no new records may be
    /// created against it.
    #[error("definition '{0}' is inactive")]
    DefinitionInactive(String),

    /// The payload (or validity window) failed validation. Carries the
    /// complete violation list.
    #[error("validation failed: {}", join_violations(.0))]
    ValidationFailed(Vec<Violation>),

    /// Activation toggle against a definition that does not enable
    /// activation.
    #[error("definition '{0}' does not enable activation")]
    ActivationNotEnabled(String),

    /// An update tried to change a record's `definition_code`. A
    /// record never moves between definitions.
    #[error("record field '{field}' is immutable")]
    ImmutableFieldViolation { field: &'static str },

    /// Versioned update failure.
    #[error(transparent)]
    Versioning(#[from] VersioningError),

    /// Backing store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LifecycleError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::Definition(e) => e.code(),
            LifecycleError::RecordNotFound(_) => "NOT_FOUND",
            LifecycleError::DefinitionInactive(_) => "DEFINITION_INACTIVE",
            LifecycleError::ValidationFailed(_) => "VALIDATION_FAILED",
            LifecycleError::ActivationNotEnabled(_) => "ACTIVATION_NOT_ENABLED",
            LifecycleError::ImmutableFieldViolation { .. } => "IMMUTABLE_FIELD_VIOLATION",
            LifecycleError::Versioning(e) => e.code(),
            LifecycleError::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            LifecycleError::DefinitionInactive("CUSTOMER".into()).code(),
            "DEFINITION_INACTIVE"
        );
        assert_eq!(
            LifecycleError::ImmutableFieldViolation {
                field: "definition_code"
            }
            .code(),
            "IMMUTABLE_FIELD_VIOLATION"
        );
        // Wrapped errors keep their own codes.
        assert_eq!(
            LifecycleError::Versioning(VersioningError::ConcurrentModification(Uuid::nil()))
                .code(),
            "CONCURRENT_MODIFICATION"
        );
    }

    #[test]
    fn test_validation_failed_lists_every_violation() {
        let err = LifecycleError::ValidationFailed(vec![
            Violation::missing_required("customerCode"),
            Violation::type_mismatch("age", "integer", "string"),
        ]);
        let message = err.to_string();
        assert!(message.contains("customerCode"));
        assert!(message.contains("age"));
    }
}
