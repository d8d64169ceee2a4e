//! Crate-level error type.
//!
//! Each subsystem raises its own error enum; this umbrella joins them
//! for callers that drive the engine as a whole. Every variant
//! forwards the subsystem's stable machine-readable code.

use thiserror::Error;

use crate::definition::DefinitionError;
use crate::lifecycle::LifecycleError;
use crate::schema::SchemaError;
use crate::store::StoreError;
use crate::versioning::VersioningError;

/// Result type for engine-level operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Versioning(#[from] VersioningError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable code, suitable for API surfaces and
    /// log correlation.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Schema(_) => "INVALID_SCHEMA",
            EngineError::Definition(e) => e.code(),
            EngineError::Lifecycle(e) => e.code(),
            EngineError::Versioning(e) => e.code(),
            EngineError::Store(_) => "STORE_ERROR",
        }
    }
}
