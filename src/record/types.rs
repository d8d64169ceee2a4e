//! Entity Record envelope.
//!
//! A record is an instance of an Entity Definition: a validated data
//! payload wrapped in an envelope of lifecycle state (activation,
//! validity window, version chain position, parent link) plus audit
//! stamps. Which envelope fields are meaningful is decided by the
//! owning definition's configuration, not by the record itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::definition::ParentLinkKind;

/// A typed parent reference.
///
/// Modeled as a dedicated field rather than a dynamically named map
/// key; the configured attribute name is applied only at the document
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub kind: ParentLinkKind,
    pub value: String,
}

impl ParentLink {
    /// Reference by the parent's record id.
    pub fn by_id(value: impl Into<String>) -> Self {
        Self {
            kind: ParentLinkKind::Id,
            value: value.into(),
        }
    }

    /// Reference by the parent's business code.
    pub fn by_code(value: impl Into<String>) -> Self {
        Self {
            kind: ParentLinkKind::Code,
            value: value.into(),
        }
    }

    /// Returns the link re-tagged with the configured kind. The value
    /// is kept verbatim; only the tag follows the definition.
    pub fn normalized_to(&self, kind: ParentLinkKind) -> Self {
        Self {
            kind,
            value: self.value.clone(),
        }
    }
}

/// One revision of an entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    /// Revision id. Each revision in a version chain has its own id.
    pub id: Uuid,
    /// Owning definition id.
    pub definition_ref: Uuid,
    /// Denormalized owning definition code, immutable per record.
    pub definition_code: String,
    /// Validated payload, conforming to the definition's schema at
    /// write time.
    pub data: Map<String, Value>,
    /// Some only when the definition enables activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Validity window; used only under time-bounding. `effective_to`
    /// of None means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<DateTime<Utc>>,
    /// Position in the version chain; meaningful under versioning.
    /// Starts at 1, successor = predecessor + 1.
    pub version: u32,
    /// Whether this revision is the chain's present state.
    pub is_current: bool,
    /// When this revision was retired; None while current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
    /// Typed parent reference; used only under hierarchy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<ParentLink>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller input for creating a record. Envelope fields the owning
/// definition does not enable are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRecord {
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<ParentLink>,
}

impl NewRecord {
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }
}

/// Caller input for updating a record. `data` keys merge over the
/// existing payload; absent envelope fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordPatch {
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<ParentLink>,
    /// A record's definition code never changes; a differing value
    /// here is rejected as an immutable-field violation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_code: Option<String>,
}

impl RecordPatch {
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }
}
