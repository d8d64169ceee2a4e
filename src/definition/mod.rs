//! Entity Definitions: runtime-authored blueprints for record types.
//!
//! A definition carries an immutable uppercase `code`, a schema for
//! record payloads, and a derived record configuration controlling
//! activation, time-bounding, versioning and hierarchy behavior. The
//! registry enforces code uniqueness and the monotonic configuration
//! rules.

mod errors;
mod registry;
mod types;

pub use errors::{DefinitionError, DefinitionResult};
pub use registry::DefinitionRegistry;
pub use types::{
    normalize_code, ActivationConfig, DefinitionDraft, DefinitionPatch, EntityDefinition,
    HierarchyConfig, ParentLinkKind, RecordConfig, VersioningConfig,
};
