//! Schema subset and payload validator.
//!
//! An Entity Definition carries a small, closed schema language: a
//! map of named field schemas plus a set of required field names.
//! The validator is a pure function over schema + payload. It applies
//! declared defaults to absent optional fields first, then checks the
//! payload, and reports every violation it finds rather than stopping
//! at the first.
//!
//! Deliberate permissiveness: payload fields that are not declared in
//! `properties` pass through unvalidated (open schema). Array and
//! object values are type-checked only; the subset has no element or
//! nested-property constraints.

mod errors;
mod types;
mod validator;

pub use errors::{join_violations, SchemaError, SchemaResult, Violation};
pub use types::{FieldFormat, FieldKind, FieldSchema, SchemaDefinition};
pub use validator::{apply_defaults, materialize, validate};
