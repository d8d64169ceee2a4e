//! Record lifecycle orchestration.
//!
//! The manager is the write path for records: it resolves the owning
//! definition, validates the payload against the definition's schema,
//! shapes the envelope from the definition's configuration, and
//! dispatches the write — in place for plain records, through the
//! versioning engine when the definition enables versioning.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{LifecycleError, LifecycleResult};
use crate::access::Actor;
use crate::definition::DefinitionRegistry;
use crate::observability::{AuditAction, AuditLog, AuditRecord, Logger};
use crate::record::{EntityRecord, NewRecord, RecordPatch};
use crate::schema::{materialize, validate, Violation};
use crate::store::{Page, Predicate, RecordStore};
use crate::versioning::VersioningEngine;

pub struct LifecycleManager {
    registry: Arc<DefinitionRegistry>,
    records: Arc<dyn RecordStore>,
    versioning: VersioningEngine,
    audit: Arc<dyn AuditLog>,
}

impl LifecycleManager {
    pub fn new(
        registry: Arc<DefinitionRegistry>,
        records: Arc<dyn RecordStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let versioning = VersioningEngine::new(records.clone(), audit.clone());
        Self {
            registry,
            records,
            versioning,
            audit,
        }
    }

    /// Creates a record against a definition.
    ///
    /// The payload is materialized (defaults applied, then validated);
    /// envelope fields the definition does not enable are ignored.
    /// Under time-bounding, a missing `effective_from` defaults to
    /// now. Every record starts its chain at version 1.
    pub fn create(
        &self,
        definition_code: &str,
        input: NewRecord,
        actor: &Actor,
    ) -> LifecycleResult<EntityRecord> {
        let definition = self.registry.get_by_code(definition_code)?;
        if !definition.is_usable() {
            return Err(LifecycleError::DefinitionInactive(definition.code.clone()));
        }

        let data = materialize(&definition.schema_definition, input.data)
            .map_err(LifecycleError::ValidationFailed)?;

        let config = &definition.record_config;
        let now = Utc::now();

        let is_active = config
            .activation
            .enabled
            .then(|| input.is_active.unwrap_or(config.activation.default_state));

        let (effective_from, effective_to) = if config.activation.use_time_bounding {
            let from = input.effective_from.unwrap_or(now);
            check_window(Some(from), input.effective_to)?;
            (Some(from), input.effective_to)
        } else {
            (None, None)
        };

        let parent_ref = if config.hierarchy.enabled {
            input
                .parent_ref
                .map(|p| p.normalized_to(config.hierarchy.link_type))
        } else {
            None
        };

        let record = EntityRecord {
            id: Uuid::new_v4(),
            definition_ref: definition.id,
            definition_code: definition.code.clone(),
            data,
            is_active,
            effective_from,
            effective_to,
            version: 1,
            is_current: true,
            expired_at: None,
            parent_ref,
            created_by: actor.id.clone(),
            updated_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.records.insert(&record)?;

        Logger::info("RECORD_CREATED", &[("code", &definition.code)]);
        self.record_audit(
            AuditRecord::success(AuditAction::RecordCreated, actor)
                .with_definition(&definition.code)
                .with_record(record.id),
        );
        Ok(record)
    }

    pub fn get(&self, id: Uuid) -> LifecycleResult<EntityRecord> {
        self.records
            .get(id)?
            .ok_or(LifecycleError::RecordNotFound(id))
    }

    /// Updates a record addressed by revision id.
    ///
    /// Patch data merges shallowly over the existing payload and the
    /// merged result is re-validated in full. When the definition
    /// enables versioning the update becomes a retire-and-insert
    /// transition; otherwise the revision is replaced in place.
    ///
    /// `definition_code` never changes: a differing value in the patch
    /// is an immutable-field violation. Envelope fields stay patch-
    /// optional; an absent field keeps its current value.
    pub fn update(
        &self,
        id: Uuid,
        patch: RecordPatch,
        actor: &Actor,
    ) -> LifecycleResult<EntityRecord> {
        let current = self.get(id)?;
        let definition = self.registry.get_by_code(&current.definition_code)?;

        if let Some(requested) = &patch.definition_code {
            if requested.trim().to_ascii_uppercase() != current.definition_code {
                return Err(LifecycleError::ImmutableFieldViolation {
                    field: "definition_code",
                });
            }
        }

        let mut prepared = current.clone();
        prepared.data = merge_data(&current.data, patch.data);
        validate(&definition.schema_definition, &prepared.data)
            .map_err(LifecycleError::ValidationFailed)?;

        let config = &definition.record_config;
        if config.activation.enabled {
            if let Some(active) = patch.is_active {
                prepared.is_active = Some(active);
            }
        }
        if config.activation.use_time_bounding {
            let from = patch.effective_from.or(current.effective_from);
            let to = patch.effective_to.or(current.effective_to);
            check_window(from, to)?;
            prepared.effective_from = from;
            prepared.effective_to = to;
        }
        if config.hierarchy.enabled {
            if let Some(parent) = patch.parent_ref {
                prepared.parent_ref = Some(parent.normalized_to(config.hierarchy.link_type));
            }
        }

        if config.versioning.enabled {
            let successor = self
                .versioning
                .supersede(&definition, &current, prepared, actor)?;
            return Ok(successor);
        }

        prepared.updated_by = actor.id.clone();
        prepared.updated_at = Utc::now();
        self.records.replace(&prepared)?;

        self.record_audit(
            AuditRecord::success(AuditAction::RecordUpdated, actor)
                .with_definition(&definition.code)
                .with_record(prepared.id),
        );
        Ok(prepared)
    }

    /// Flips a record's activation flag in place. Activation is
    /// envelope state, not payload history, so the toggle never
    /// creates a revision.
    pub fn toggle_activation(
        &self,
        id: Uuid,
        active: bool,
        actor: &Actor,
    ) -> LifecycleResult<EntityRecord> {
        let mut record = self.get(id)?;
        let definition = self.registry.get_by_code(&record.definition_code)?;
        if !definition.record_config.activation.enabled {
            return Err(LifecycleError::ActivationNotEnabled(definition.code));
        }

        record.is_active = Some(active);
        record.updated_by = actor.id.clone();
        record.updated_at = Utc::now();
        self.records.replace(&record)?;

        self.record_audit(
            AuditRecord::success(AuditAction::RecordActivationToggled, actor)
                .with_definition(&record.definition_code)
                .with_record(record.id)
                .with_detail(if active { "activated" } else { "deactivated" }),
        );
        Ok(record)
    }

    /// Hard delete of one revision.
    pub fn delete(&self, id: Uuid, actor: &Actor) -> LifecycleResult<()> {
        let record = self.get(id)?;
        if !self.records.remove(id)? {
            return Err(LifecycleError::RecordNotFound(id));
        }
        self.record_audit(
            AuditRecord::success(AuditAction::RecordDeleted, actor)
                .with_definition(&record.definition_code)
                .with_record(id),
        );
        Ok(())
    }

    /// Current revisions of a definition matching every predicate,
    /// in deterministic (creation time, then id) order, windowed by
    /// `page`. Retired revisions are reachable through
    /// [`Self::list_revisions`], never through listing.
    pub fn list(
        &self,
        definition_code: &str,
        predicates: &[Predicate],
        page: Page,
    ) -> LifecycleResult<Vec<EntityRecord>> {
        let definition = self.registry.get_by_code(definition_code)?;
        let mut hits = self.records.find(&definition.code, predicates)?;
        hits.retain(|r| r.is_current);
        hits.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(page.apply(hits))
    }

    /// Full version chain of the record a revision belongs to, newest
    /// first.
    pub fn list_revisions(&self, id: Uuid) -> LifecycleResult<Vec<EntityRecord>> {
        let revision = self.get(id)?;
        let definition = self.registry.get_by_code(&revision.definition_code)?;
        Ok(self.versioning.list_revisions(&definition, &revision)?)
    }

    fn record_audit(&self, record: AuditRecord) {
        if self.audit.append(&record).is_err() {
            Logger::warn("AUDIT_APPEND_FAILED", &[("action", record.action.as_str())]);
        }
    }
}

/// Shallow merge: patch keys overwrite, everything else survives. An
/// explicit null survives the merge and fails re-validation for any
/// declared field, required or optional; only undeclared (open-schema)
/// fields can be nulled out.
fn merge_data(current: &Map<String, Value>, patch: Map<String, Value>) -> Map<String, Value> {
    let mut merged = current.clone();
    for (key, value) in patch {
        merged.insert(key, value);
    }
    merged
}

/// Rejects a validity window that does not end strictly after it
/// starts; a zero-length window is as invalid as an inverted one.
fn check_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> LifecycleResult<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if to <= from {
            return Err(LifecycleError::ValidationFailed(vec![Violation::new(
                "effectiveTo",
                "window",
                format!("validity window must end ({to}) strictly after it starts ({from})"),
            )]));
        }
    }
    Ok(())
}
