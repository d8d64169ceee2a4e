//! Entity Definition model.
//!
//! A definition is a runtime-defined record type: identity (`code`),
//! metadata, a schema for record payloads, and the lifecycle
//! configuration that shapes the records derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{DefinitionError, DefinitionResult};
use crate::schema::SchemaDefinition;

/// Activation and time-bounding behavior for derived records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivationConfig {
    /// Records carry an `is_active` flag.
    pub enabled: bool,
    /// Initial `is_active` when the caller supplies none.
    pub default_state: bool,
    /// Definition-level usability gate: when false, no new records may
    /// be created against this definition (existing ones stay
    /// readable). Independent of `enabled`.
    pub entity_active: bool,
    /// Records carry an `effective_from`/`effective_to` validity window.
    pub use_time_bounding: bool,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_state: true,
            entity_active: true,
            use_time_bounding: false,
        }
    }
}

/// Append-only versioning behavior for derived records.
///
/// `enabled` is monotonic: false to true only, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersioningConfig {
    pub enabled: bool,
}

/// How a parent reference identifies the parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentLinkKind {
    /// Parent's record id.
    Id,
    /// Parent's business code.
    Code,
}

/// Parent/child linkage behavior for derived records.
///
/// `enabled` is monotonic, like versioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HierarchyConfig {
    pub enabled: bool,
    /// Attribute name holding the parent reference in the record's
    /// document form. Internally the link is a typed field; this name
    /// only applies at the serialization boundary.
    pub parent_link_field: String,
    pub link_type: ParentLinkKind,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            parent_link_field: "parentId".to_string(),
            link_type: ParentLinkKind::Id,
        }
    }
}

/// Per-type configuration driving the lifecycle of derived records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordConfig {
    pub activation: ActivationConfig,
    pub versioning: VersioningConfig,
    pub hierarchy: HierarchyConfig,
}

impl RecordConfig {
    /// Rejects true-to-false flips of the monotonic flags.
    pub fn check_monotonic(&self, next: &RecordConfig) -> DefinitionResult<()> {
        if self.versioning.enabled && !next.versioning.enabled {
            return Err(DefinitionError::MonotonicConfigViolation(
                "versioning.enabled",
            ));
        }
        if self.hierarchy.enabled && !next.hierarchy.enabled {
            return Err(DefinitionError::MonotonicConfigViolation(
                "hierarchy.enabled",
            ));
        }
        Ok(())
    }
}

/// A runtime-defined record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub id: Uuid,
    /// Unique, immutable, uppercase alphanumeric + underscore.
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema_definition: SchemaDefinition,
    #[serde(rename = "derivedRecordConfig")]
    pub record_config: RecordConfig,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityDefinition {
    /// Whether new records may be created against this definition.
    pub fn is_usable(&self) -> bool {
        self.record_config.activation.entity_active
    }
}

/// Input for creating a definition. The registry assigns identity and
/// stamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefinitionDraft {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema_definition: SchemaDefinition,
    #[serde(rename = "derivedRecordConfig")]
    pub record_config: RecordConfig,
}

impl DefinitionDraft {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: SchemaDefinition) -> Self {
        self.schema_definition = schema;
        self
    }

    pub fn with_record_config(mut self, config: RecordConfig) -> Self {
        self.record_config = config;
        self
    }
}

/// Patch for updating a definition. Absent fields are left unchanged.
/// A `code` value is stripped as a no-op (tolerates idempotent client
/// payloads) and flagged to the audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefinitionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_definition: Option<SchemaDefinition>,
    #[serde(rename = "derivedRecordConfig", skip_serializing_if = "Option::is_none")]
    pub record_config: Option<RecordConfig>,
}

/// Uppercases and checks a definition code.
pub fn normalize_code(raw: &str) -> DefinitionResult<String> {
    let code = raw.trim().to_ascii_uppercase();
    let well_formed = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    if !well_formed {
        return Err(DefinitionError::InvalidCode(raw.to_string()));
    }
    Ok(code)
}
