//! Store error types.

use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Backing-store failures.
///
/// Absence that a caller can act on (lookup misses, lost
/// conditional writes) is reported through return values, not through
/// this enum; these are the failures of the store itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An update targeted a row that does not exist.
    #[error("row '{0}' does not exist")]
    RowMissing(String),

    /// An in-place replace targeted a retired revision. Retired
    /// revisions are immutable historical snapshots.
    #[error("record revision '{0}' is retired and cannot be replaced")]
    RowRetired(Uuid),

    /// Implementation-specific failure (I/O, connection, encoding).
    #[error("backend failure: {0}")]
    Backend(String),
}
