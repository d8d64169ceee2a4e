//! Versioning error types.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Result type for versioning operations
pub type VersioningResult<T> = Result<T, VersioningError>;

/// Errors raised by the versioning engine.
#[derive(Debug, Error)]
pub enum VersioningError {
    /// The owning definition does not enable versioning.
    #[error("definition '{0}' does not enable versioning")]
    NotEnabled(String),

    /// No business key could be derived: the current revision's data
    /// carries none of the definition's required fields, so the
    /// version chain cannot be identified.
    #[error("cannot derive a business key for definition '{0}'")]
    IndeterminateIdentity(String),

    /// The revision was retired by a concurrent update between read
    /// and write. The caller lost the race; retry against the new
    /// current revision.
    #[error("revision {0} is no longer current")]
    ConcurrentModification(Uuid),

    /// Backing store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl VersioningError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            VersioningError::NotEnabled(_) => "VERSIONING_NOT_ENABLED",
            VersioningError::IndeterminateIdentity(_) => "INDETERMINATE_IDENTITY",
            VersioningError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            VersioningError::Store(_) => "STORE_ERROR",
        }
    }
}
