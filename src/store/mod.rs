//! Backing store contract.
//!
//! The engine assumes a document-oriented store reachable by id and by
//! filter predicate. It does not specify the store's engine; the
//! traits here are the whole contract, and `memory` provides the
//! default in-process implementation.
//!
//! The one non-obvious requirement is the conditional write
//! [`RecordStore::supersede`]: the versioning transition depends on it
//! to guarantee that two racing updates cannot both retire the same
//! current revision, and that readers never observe a chain between
//! the retirement and the successor insert.

mod errors;
mod filter;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use filter::{matches, FilterOp, Page, Predicate, DEFAULT_PAGE_LIMIT};
pub use memory::{MemoryDefinitionStore, MemoryRecordStore};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::access::Actor;
use crate::definition::EntityDefinition;
use crate::record::EntityRecord;

/// Storage for entity definitions, keyed by code.
pub trait DefinitionStore: Send + Sync {
    /// Inserts a new definition. Returns false (and stores nothing)
    /// when the code is already taken.
    fn insert_new(&self, definition: &EntityDefinition) -> StoreResult<bool>;

    /// Replaces an existing definition in full.
    fn update(&self, definition: &EntityDefinition) -> StoreResult<()>;

    fn get_by_code(&self, code: &str) -> StoreResult<Option<EntityDefinition>>;

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<EntityDefinition>>;

    /// Removes a definition. Returns false when the code is unknown.
    fn remove(&self, code: &str) -> StoreResult<bool>;
}

/// Storage for entity records, keyed by revision id.
pub trait RecordStore: Send + Sync {
    fn insert(&self, record: &EntityRecord) -> StoreResult<()>;

    /// In-place replacement for non-versioned updates. Fails with
    /// [`StoreError::RowRetired`] when the stored revision is no
    /// longer current.
    fn replace(&self, record: &EntityRecord) -> StoreResult<()>;

    fn get(&self, id: Uuid) -> StoreResult<Option<EntityRecord>>;

    /// Hard delete of one revision. Returns false when the id is
    /// unknown.
    fn remove(&self, id: Uuid) -> StoreResult<bool>;

    /// All records of a definition whose `data` satisfies every
    /// predicate. Ordering is the implementation's choice; callers
    /// sort.
    fn find(&self, definition_code: &str, predicates: &[Predicate])
        -> StoreResult<Vec<EntityRecord>>;

    /// Conditionally replaces a current revision with its successor as
    /// ONE logical write: if and only if the stored row at `current_id`
    /// still has `is_current = true`, it is retired (`is_current =
    /// false`, `expired_at`, update stamps) and `successor` is
    /// inserted. Returns false (and writes nothing) when the condition
    /// fails — the concurrent-modification signal.
    ///
    /// Retirement and insert must not be separately observable:
    /// readers see either the old current revision or the new one,
    /// never a chain with zero or two current revisions.
    fn supersede(
        &self,
        current_id: Uuid,
        successor: &EntityRecord,
        expired_at: DateTime<Utc>,
        actor: &Actor,
    ) -> StoreResult<bool>;
}
