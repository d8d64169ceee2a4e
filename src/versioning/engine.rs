//! Append-only version chains with retire-and-insert transitions.
//!
//! Under versioning, an update never mutates the stored revision.
//! Instead the current revision is retired (conditionally, to detect
//! racing writers) and a successor with `version + 1` is inserted.
//! Revisions of one logical record are tied together by the business
//! key: the values of the definition's required fields as they appear
//! in the current revision's data.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{VersioningError, VersioningResult};
use crate::access::Actor;
use crate::definition::EntityDefinition;
use crate::observability::{AuditAction, AuditLog, AuditRecord, Logger};
use crate::record::EntityRecord;
use crate::store::{Predicate, RecordStore};

pub struct VersioningEngine {
    records: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditLog>,
}

impl VersioningEngine {
    pub fn new(records: Arc<dyn RecordStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { records, audit }
    }

    /// Derives the business key of a revision: the (field, value)
    /// pairs of the definition's required fields that are present and
    /// non-null in the revision's data. Deterministic order (required
    /// is a sorted set).
    ///
    /// The key is re-derived per lookup, not stored. If a later schema
    /// change alters the required set, old chains may stop resolving;
    /// that fragility is accepted in exchange for a stateless chain
    /// identity.
    pub fn business_key(
        definition: &EntityDefinition,
        revision: &EntityRecord,
    ) -> VersioningResult<Vec<(String, Value)>> {
        let key: Vec<(String, Value)> = definition
            .schema_definition
            .required
            .iter()
            .filter_map(|name| {
                revision
                    .data
                    .get(name)
                    .filter(|v| !v.is_null())
                    .map(|v| (name.clone(), v.clone()))
            })
            .collect();

        if key.is_empty() {
            return Err(VersioningError::IndeterminateIdentity(
                definition.code.clone(),
            ));
        }
        Ok(key)
    }

    /// Replaces the current revision with a prepared successor.
    ///
    /// `prepared` carries the successor's data and envelope; this
    /// method assigns its chain position (fresh id, `version + 1`,
    /// current, unretired) and keeps the predecessor's creation
    /// stamps. Retirement and insert happen as one conditional store
    /// write, so readers always see exactly one current revision and
    /// a writer that lost the race writes nothing and gets
    /// [`VersioningError::ConcurrentModification`].
    pub fn supersede(
        &self,
        definition: &EntityDefinition,
        current: &EntityRecord,
        prepared: EntityRecord,
        actor: &Actor,
    ) -> VersioningResult<EntityRecord> {
        if !definition.record_config.versioning.enabled {
            return Err(VersioningError::NotEnabled(definition.code.clone()));
        }
        // The key must be derivable before anything is retired.
        Self::business_key(definition, current)?;

        let now = Utc::now();
        let successor = EntityRecord {
            id: Uuid::new_v4(),
            version: current.version + 1,
            is_current: true,
            expired_at: None,
            created_by: current.created_by.clone(),
            created_at: current.created_at,
            updated_by: actor.id.clone(),
            updated_at: now,
            ..prepared
        };
        if !self.records.supersede(current.id, &successor, now, actor)? {
            return Err(VersioningError::ConcurrentModification(current.id));
        }

        Logger::info(
            "RECORD_REVISED",
            &[
                ("code", &definition.code),
                ("version", &successor.version.to_string()),
            ],
        );
        let entry = AuditRecord::success(AuditAction::RecordRevised, actor)
            .with_definition(&definition.code)
            .with_record(successor.id)
            .with_detail(format!(
                "version {} supersedes {}",
                successor.version, current.version
            ));
        if self.audit.append(&entry).is_err() {
            Logger::warn("AUDIT_APPEND_FAILED", &[("action", entry.action.as_str())]);
        }

        Ok(successor)
    }

    /// Full history of the chain a revision belongs to, newest
    /// version first.
    pub fn list_revisions(
        &self,
        definition: &EntityDefinition,
        revision: &EntityRecord,
    ) -> VersioningResult<Vec<EntityRecord>> {
        if !definition.record_config.versioning.enabled {
            return Err(VersioningError::NotEnabled(definition.code.clone()));
        }
        let key = Self::business_key(definition, revision)?;
        let predicates: Vec<Predicate> = key
            .into_iter()
            .map(|(field, value)| Predicate::eq(field, value))
            .collect();

        let mut revisions = self.records.find(&definition.code, &predicates)?;
        revisions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(revisions)
    }
}
