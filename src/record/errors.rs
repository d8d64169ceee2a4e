//! Record document errors.

use thiserror::Error;

/// Result type for document encoding/decoding
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Problems turning a boundary document back into a record envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document is missing field '{0}'")]
    MissingField(&'static str),

    #[error("document field '{field}' is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },
}

impl DocumentError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field,
            reason: reason.into(),
        }
    }
}
