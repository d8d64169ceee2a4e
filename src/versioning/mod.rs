//! Append-only record versioning.
//!
//! Updates to a versioned record retire the current revision and
//! insert a successor; history is never rewritten. Chain identity is
//! the business key derived from the definition's required fields.
//! Concurrent writers are serialized by the store's conditional
//! supersede, one logical write covering retirement and insert:
//! exactly one of two racing updates wins, and readers always see
//! exactly one current revision per chain.

mod engine;
mod errors;

pub use engine::VersioningEngine;
pub use errors::{VersioningError, VersioningResult};
