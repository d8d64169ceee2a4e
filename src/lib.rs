//! dynent - a strict, runtime-configurable entity modeling engine
//!
//! Operators define record types at runtime (an Entity Definition:
//! name, code, a data schema, a set of lifecycle behaviors) and then
//! create, mutate, and query instances of that type (Entity Records)
//! whose structure is enforced by the definition rather than by
//! static code.
//!
//! Subsystems, leaves first:
//! - `schema`: the schema subset and the pure payload validator
//! - `definition`: Entity Definition identity and configuration rules
//! - `record`: the Entity Record envelope and its boundary encoding
//! - `store`: backing store contract, filters, in-memory implementation
//! - `lifecycle`: activation, time-bounding and hierarchy placement
//! - `versioning`: retire-and-insert revision transitions
//! - `access`: actor identity and the capability-check seam
//! - `observability`: structured logging and the audit side-channel

pub mod access;
pub mod definition;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod record;
pub mod schema;
pub mod store;
pub mod versioning;
