//! Entity Record model and its boundary encoding.

mod document;
mod errors;
mod types;

pub use document::{from_document, to_document};
pub use errors::{DocumentError, DocumentResult};
pub use types::{EntityRecord, NewRecord, ParentLink, RecordPatch};
