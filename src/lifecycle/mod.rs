//! Record lifecycle: create, read, update, toggle, delete, list.
//!
//! All record writes flow through the [`LifecycleManager`], which
//! joins the other modules: the definition registry supplies the
//! blueprint, the schema validator guards the payload, the store
//! persists, and the versioning engine handles retire-and-insert
//! transitions for versioned definitions.

mod errors;
mod manager;

pub use errors::{LifecycleError, LifecycleResult};
pub use manager::LifecycleManager;
