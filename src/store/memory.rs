//! In-memory store implementation.
//!
//! `RwLock`-guarded maps. Reads take the read lock and run in
//! parallel; the conditional supersede takes the write lock once, so
//! check, retirement and successor insert form one transition that no
//! reader or racing writer can observe half-done.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::filter::{matches, Predicate};
use super::{DefinitionStore, RecordStore};
use crate::access::Actor;
use crate::definition::EntityDefinition;
use crate::record::EntityRecord;

/// Definitions keyed by code.
#[derive(Debug, Default)]
pub struct MemoryDefinitionStore {
    rows: RwLock<HashMap<String, EntityDefinition>>,
}

impl MemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DefinitionStore for MemoryDefinitionStore {
    fn insert_new(&self, definition: &EntityDefinition) -> StoreResult<bool> {
        let mut rows = self.rows.write().unwrap();
        if rows.contains_key(&definition.code) {
            return Ok(false);
        }
        rows.insert(definition.code.clone(), definition.clone());
        Ok(true)
    }

    fn update(&self, definition: &EntityDefinition) -> StoreResult<()> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&definition.code) {
            Some(row) => {
                *row = definition.clone();
                Ok(())
            }
            None => Err(StoreError::RowMissing(definition.code.clone())),
        }
    }

    fn get_by_code(&self, code: &str) -> StoreResult<Option<EntityDefinition>> {
        Ok(self.rows.read().unwrap().get(code).cloned())
    }

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<EntityDefinition>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .find(|d| d.id == id)
            .cloned())
    }

    fn remove(&self, code: &str) -> StoreResult<bool> {
        Ok(self.rows.write().unwrap().remove(code).is_some())
    }
}

/// Record revisions keyed by revision id.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<HashMap<Uuid, EntityRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored revisions, across all definitions.
    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().unwrap().is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert(&self, record: &EntityRecord) -> StoreResult<()> {
        self.rows
            .write()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(())
    }

    fn replace(&self, record: &EntityRecord) -> StoreResult<()> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&record.id) {
            Some(row) if !row.is_current => Err(StoreError::RowRetired(record.id)),
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(StoreError::RowMissing(record.id.to_string())),
        }
    }

    fn get(&self, id: Uuid) -> StoreResult<Option<EntityRecord>> {
        Ok(self.rows.read().unwrap().get(&id).cloned())
    }

    fn remove(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.rows.write().unwrap().remove(&id).is_some())
    }

    fn find(
        &self,
        definition_code: &str,
        predicates: &[Predicate],
    ) -> StoreResult<Vec<EntityRecord>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|r| r.definition_code == definition_code)
            .filter(|r| matches(&r.data, predicates))
            .cloned()
            .collect())
    }

    fn supersede(
        &self,
        current_id: Uuid,
        successor: &EntityRecord,
        expired_at: DateTime<Utc>,
        actor: &Actor,
    ) -> StoreResult<bool> {
        // One write-lock acquisition covers check, retire and insert.
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&current_id) {
            Some(row) if row.is_current => {
                row.is_current = false;
                row.expired_at = Some(expired_at);
                row.updated_by = actor.id.clone();
                row.updated_at = expired_at;
            }
            Some(_) => return Ok(false),
            None => return Err(StoreError::RowMissing(current_id.to_string())),
        }
        rows.insert(successor.id, successor.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DefinitionDraft, RecordConfig};
    use crate::schema::SchemaDefinition;
    use serde_json::json;

    fn sample_definition(code: &str) -> EntityDefinition {
        let now = Utc::now();
        let draft = DefinitionDraft::new(code, "Sample")
            .with_schema(SchemaDefinition::new())
            .with_record_config(RecordConfig::default());
        EntityDefinition {
            id: Uuid::new_v4(),
            code: draft.code,
            name: draft.name,
            description: None,
            schema_definition: draft.schema_definition,
            record_config: draft.record_config,
            created_by: "u1".into(),
            updated_by: "u1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_record(code: &str, data: serde_json::Value) -> EntityRecord {
        let now = Utc::now();
        EntityRecord {
            id: Uuid::new_v4(),
            definition_ref: Uuid::new_v4(),
            definition_code: code.into(),
            data: data.as_object().cloned().unwrap(),
            is_active: None,
            effective_from: None,
            effective_to: None,
            version: 1,
            is_current: true,
            expired_at: None,
            parent_ref: None,
            created_by: "u1".into(),
            updated_by: "u1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_definition_insert_new_rejects_duplicates() {
        let store = MemoryDefinitionStore::new();
        let def = sample_definition("CUSTOMER");
        assert!(store.insert_new(&def).unwrap());
        assert!(!store.insert_new(&def).unwrap());
    }

    #[test]
    fn test_definition_lookup_by_code_and_id() {
        let store = MemoryDefinitionStore::new();
        let def = sample_definition("CUSTOMER");
        store.insert_new(&def).unwrap();

        assert_eq!(store.get_by_code("CUSTOMER").unwrap().unwrap().id, def.id);
        assert_eq!(store.get_by_id(def.id).unwrap().unwrap().code, "CUSTOMER");
        assert!(store.get_by_code("ORDER").unwrap().is_none());
    }

    #[test]
    fn test_definition_update_requires_existing_row() {
        let store = MemoryDefinitionStore::new();
        let def = sample_definition("CUSTOMER");
        let err = store.update(&def).unwrap_err();
        assert!(matches!(err, StoreError::RowMissing(_)));
    }

    #[test]
    fn test_record_find_filters_by_definition_and_predicates() {
        let store = MemoryRecordStore::new();
        store
            .insert(&sample_record("CUSTOMER", json!({ "tier": "premium" })))
            .unwrap();
        store
            .insert(&sample_record("CUSTOMER", json!({ "tier": "standard" })))
            .unwrap();
        store
            .insert(&sample_record("ORDER", json!({ "tier": "premium" })))
            .unwrap();

        let hits = store
            .find("CUSTOMER", &[Predicate::eq("tier", json!("premium"))])
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].definition_code, "CUSTOMER");
    }

    #[test]
    fn test_supersede_is_single_shot() {
        let store = MemoryRecordStore::new();
        let record = sample_record("CUSTOMER", json!({}));
        store.insert(&record).unwrap();

        let mut successor = sample_record("CUSTOMER", json!({}));
        successor.version = 2;
        let actor = Actor::new("u2", "Bob");
        let now = Utc::now();
        assert!(store
            .supersede(record.id, &successor, now, &actor)
            .unwrap());
        // Second attempt loses the condition and writes nothing.
        let mut another = sample_record("CUSTOMER", json!({}));
        another.version = 2;
        assert!(!store
            .supersede(record.id, &another, now, &actor)
            .unwrap());
        assert_eq!(store.len(), 2);

        let retired = store.get(record.id).unwrap().unwrap();
        assert!(!retired.is_current);
        assert_eq!(retired.expired_at, Some(now));
        assert_eq!(retired.updated_by, "u2");

        let inserted = store.get(successor.id).unwrap().unwrap();
        assert!(inserted.is_current);
        assert_eq!(inserted.version, 2);
    }

    #[test]
    fn test_supersede_unknown_row_is_an_error() {
        let store = MemoryRecordStore::new();
        let successor = sample_record("CUSTOMER", json!({}));
        let err = store
            .supersede(Uuid::new_v4(), &successor, Utc::now(), &Actor::new("u1", "A"))
            .unwrap_err();
        assert!(matches!(err, StoreError::RowMissing(_)));
    }

    #[test]
    fn test_replace_refuses_retired_revision() {
        let store = MemoryRecordStore::new();
        let record = sample_record("CUSTOMER", json!({}));
        store.insert(&record).unwrap();
        let successor = sample_record("CUSTOMER", json!({}));
        store
            .supersede(record.id, &successor, Utc::now(), &Actor::new("u1", "A"))
            .unwrap();

        let err = store.replace(&record).unwrap_err();
        assert_eq!(err, StoreError::RowRetired(record.id));
    }
}
