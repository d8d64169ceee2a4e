//! Actor identity and the capability-check seam.
//!
//! The engine never authenticates and never authorizes. The
//! surrounding system hands it an [`Actor`] for audit stamping and is
//! expected to have evaluated [`CapabilityCheck::has_capability`]
//! before invoking any mutating operation. The trait lives here so
//! that embedders and tests share one vocabulary for the decision the
//! engine consumes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The identity performing an operation, as established by the
/// surrounding authentication layer.
///
/// Only used for audit stamping (`created_by` / `updated_by`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identity, stamped onto records and audit entries.
    pub id: String,
    /// Human-readable name for audit output.
    pub display_name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Capabilities the surrounding system checks before calling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read entity records.
    ViewEntityRecords,
    /// Create entity records.
    CreateEntity,
    /// Mutate entity records.
    EditEntity,
    /// Hard-delete an entity record revision.
    DeleteEntityRecord,
    /// Create, update, toggle or delete entity definitions.
    ManageDefinitions,
}

impl Capability {
    /// Wire name, matching the capability vocabulary of the
    /// surrounding system.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewEntityRecords => "view_entity_records",
            Capability::CreateEntity => "create_entity",
            Capability::EditEntity => "edit_entity",
            Capability::DeleteEntityRecord => "delete_entity_record",
            Capability::ManageDefinitions => "manage_definitions",
        }
    }
}

/// The yes/no authorization decision the engine consumes.
///
/// Implementations belong to the surrounding system; the engine never
/// calls this itself.
pub trait CapabilityCheck: Send + Sync {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool;
}

/// Grants everything. The default for embedded and test use.
#[derive(Debug, Default)]
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn has_capability(&self, _actor: &Actor, _capability: Capability) -> bool {
        true
    }
}

/// A fixed actor-to-capability table.
#[derive(Debug, Default)]
pub struct StaticCapabilities {
    grants: HashSet<(String, Capability)>,
}

impl StaticCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a capability to an actor id.
    pub fn grant(mut self, actor_id: impl Into<String>, capability: Capability) -> Self {
        self.grants.insert((actor_id.into(), capability));
        self
    }
}

impl CapabilityCheck for StaticCapabilities {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool {
        self.grants.contains(&(actor.id.clone(), capability))
    }
}
