//! Definition error types.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for definition operations
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Errors raised by the definition registry.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A definition with this code already exists.
    #[error("definition code '{0}' already exists")]
    DuplicateCode(String),

    /// Code is empty or contains characters outside `[A-Z0-9_]`.
    #[error("definition code '{0}' is not uppercase alphanumeric/underscore")]
    InvalidCode(String),

    /// The schema definition is structurally broken.
    #[error("invalid schema definition: {0}")]
    InvalidSchema(#[from] crate::schema::SchemaError),

    /// No definition with this code or id.
    #[error("definition '{0}' not found")]
    NotFound(String),

    /// Attempt to flip `versioning.enabled` or `hierarchy.enabled`
    /// back from true to false. Changing either after records exist
    /// would corrupt history or links, so the transition is one-way.
    #[error("config flag '{0}' cannot be disabled once enabled")]
    MonotonicConfigViolation(&'static str),

    /// Backing store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DefinitionError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DefinitionError::DuplicateCode(_) => "DUPLICATE_CODE",
            DefinitionError::InvalidCode(_) => "INVALID_CODE",
            DefinitionError::InvalidSchema(_) => "INVALID_SCHEMA",
            DefinitionError::NotFound(_) => "NOT_FOUND",
            DefinitionError::MonotonicConfigViolation(_) => "MONOTONIC_CONFIG_VIOLATION",
            DefinitionError::Store(_) => "STORE_ERROR",
        }
    }
}
