//! Entity Definition registry.
//!
//! Owns definition identity and the configuration-transition rules:
//! codes are normalized to uppercase and unique, `code` is immutable
//! after creation (attempts are stripped and flagged, not errored),
//! and the versioning/hierarchy flags only ever move false to true.
//! The monotonic check is optimistic: it is evaluated against the
//! latest stored definition at write time.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{DefinitionError, DefinitionResult};
use super::types::{normalize_code, DefinitionDraft, DefinitionPatch, EntityDefinition};
use crate::access::Actor;
use crate::observability::{AuditAction, AuditLog, AuditOutcome, AuditRecord, Logger};
use crate::store::DefinitionStore;

pub struct DefinitionRegistry {
    store: Arc<dyn DefinitionStore>,
    audit: Arc<dyn AuditLog>,
}

impl DefinitionRegistry {
    pub fn new(store: Arc<dyn DefinitionStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { store, audit }
    }

    /// Creates a definition. The code is uppercased before the
    /// uniqueness check; the schema must be structurally sound.
    pub fn create(
        &self,
        draft: DefinitionDraft,
        actor: &Actor,
    ) -> DefinitionResult<EntityDefinition> {
        let code = normalize_code(&draft.code)?;
        draft.schema_definition.validate_structure()?;

        let now = Utc::now();
        let definition = EntityDefinition {
            id: Uuid::new_v4(),
            code: code.clone(),
            name: draft.name,
            description: draft.description,
            schema_definition: draft.schema_definition,
            record_config: draft.record_config,
            created_by: actor.id.clone(),
            updated_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
        };

        if !self.store.insert_new(&definition)? {
            return Err(DefinitionError::DuplicateCode(code));
        }

        Logger::info("DEFINITION_CREATED", &[("code", &code)]);
        self.record_audit(
            AuditRecord::success(AuditAction::DefinitionCreated, actor).with_definition(&code),
        );
        Ok(definition)
    }

    /// Applies a patch to an existing definition.
    ///
    /// A `code` change is stripped as a no-op and flagged to the audit
    /// log, tolerating idempotent client payloads. Flipping
    /// `versioning.enabled` or `hierarchy.enabled` back to false is
    /// rejected.
    pub fn update(
        &self,
        code: &str,
        patch: DefinitionPatch,
        actor: &Actor,
    ) -> DefinitionResult<EntityDefinition> {
        let mut definition = self.get_by_code(code)?;

        if let Some(requested) = &patch.code {
            let differs = normalize_code(requested)
                .map(|normalized| normalized != definition.code)
                .unwrap_or(true);
            if differs {
                Logger::warn(
                    "DEFINITION_CODE_CHANGE_STRIPPED",
                    &[("code", &definition.code), ("requested", requested)],
                );
                self.record_audit(
                    AuditRecord::new(AuditAction::CodeChangeStripped, AuditOutcome::Rejected, actor)
                        .with_definition(&definition.code)
                        .with_detail(format!("requested code '{requested}'")),
                );
            }
        }

        if let Some(next_config) = &patch.record_config {
            definition.record_config.check_monotonic(next_config)?;
        }
        if let Some(schema) = patch.schema_definition {
            schema.validate_structure()?;
            definition.schema_definition = schema;
        }
        if let Some(name) = patch.name {
            definition.name = name;
        }
        if let Some(description) = patch.description {
            definition.description = Some(description);
        }
        if let Some(config) = patch.record_config {
            definition.record_config = config;
        }

        definition.updated_by = actor.id.clone();
        definition.updated_at = Utc::now();
        self.store.update(&definition)?;

        self.record_audit(
            AuditRecord::success(AuditAction::DefinitionUpdated, actor)
                .with_definition(&definition.code),
        );
        Ok(definition)
    }

    pub fn get_by_code(&self, code: &str) -> DefinitionResult<EntityDefinition> {
        let lookup = code.trim().to_ascii_uppercase();
        self.store
            .get_by_code(&lookup)?
            .ok_or(DefinitionError::NotFound(lookup))
    }

    pub fn get_by_id(&self, id: Uuid) -> DefinitionResult<EntityDefinition> {
        self.store
            .get_by_id(id)?
            .ok_or_else(|| DefinitionError::NotFound(id.to_string()))
    }

    /// Flips the definition-level usability gate. Unrestricted: this
    /// is not a monotonic flag, and existing records stay readable
    /// either way.
    pub fn toggle_usable(
        &self,
        code: &str,
        active: bool,
        actor: &Actor,
    ) -> DefinitionResult<EntityDefinition> {
        let mut definition = self.get_by_code(code)?;
        definition.record_config.activation.entity_active = active;
        definition.updated_by = actor.id.clone();
        definition.updated_at = Utc::now();
        self.store.update(&definition)?;

        self.record_audit(
            AuditRecord::success(AuditAction::DefinitionToggled, actor)
                .with_definition(&definition.code)
                .with_detail(if active { "activated" } else { "deactivated" }),
        );
        Ok(definition)
    }

    /// Hard delete. The surrounding system guarantees no records still
    /// reference the definition; that precondition is not re-checked
    /// here.
    pub fn delete(&self, code: &str, actor: &Actor) -> DefinitionResult<()> {
        let lookup = code.trim().to_ascii_uppercase();
        if !self.store.remove(&lookup)? {
            return Err(DefinitionError::NotFound(lookup));
        }
        self.record_audit(
            AuditRecord::success(AuditAction::DefinitionDeleted, actor).with_definition(&lookup),
        );
        Ok(())
    }

    /// Audit failures never veto the audited operation.
    fn record_audit(&self, record: AuditRecord) {
        if self.audit.append(&record).is_err() {
            Logger::warn("AUDIT_APPEND_FAILED", &[("action", record.action.as_str())]);
        }
    }
}
