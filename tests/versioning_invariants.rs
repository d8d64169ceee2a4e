//! Versioning Invariant Tests
//!
//! Tests for the append-only version chain:
//! - Retire-and-insert transitions, never in-place history rewrites
//! - Exactly one current revision per chain
//! - Version numbers are gapless and strictly increasing
//! - Racing updates: exactly one winner
//! - Business-key chain identity

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Map, Value};

use dynent::access::Actor;
use dynent::definition::{DefinitionDraft, DefinitionRegistry, RecordConfig};
use dynent::lifecycle::{LifecycleError, LifecycleManager};
use dynent::observability::{AuditAction, MemoryAuditLog};
use dynent::record::{NewRecord, RecordPatch};
use dynent::schema::{FieldSchema, SchemaDefinition};
use dynent::store::{MemoryDefinitionStore, MemoryRecordStore, Predicate, RecordStore};
use dynent::versioning::VersioningError;

struct Harness {
    registry: Arc<DefinitionRegistry>,
    manager: Arc<LifecycleManager>,
    records: Arc<MemoryRecordStore>,
    audit: MemoryAuditLog,
}

fn harness() -> Harness {
    let audit = MemoryAuditLog::new();
    let registry = Arc::new(DefinitionRegistry::new(
        Arc::new(MemoryDefinitionStore::new()),
        Arc::new(audit.clone()),
    ));
    let records = Arc::new(MemoryRecordStore::new());
    let manager = Arc::new(LifecycleManager::new(
        registry.clone(),
        records.clone(),
        Arc::new(audit.clone()),
    ));
    Harness {
        registry,
        manager,
        records,
        audit,
    }
}

fn actor() -> Actor {
    Actor::new("op-1", "Operator")
}

fn define_versioned_customer(h: &Harness) {
    let mut config = RecordConfig::default();
    config.versioning.enabled = true;
    h.registry
        .create(
            DefinitionDraft::new("CUSTOMER", "Customer")
                .with_schema(
                    SchemaDefinition::new()
                        .with_property("customerCode", FieldSchema::string())
                        .with_property("email", FieldSchema::string())
                        .with_required("customerCode"),
                )
                .with_record_config(config),
            &actor(),
        )
        .unwrap();
}

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// =============================================================================
// Retire-and-Insert
// =============================================================================

/// The canonical chain: create is version 1 and current; an update
/// retires it and inserts version 2; history lists newest first.
#[test]
fn test_update_builds_a_two_revision_chain() {
    let h = harness();
    define_versioned_customer(&h);

    let v1 = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(
                json!({ "customerCode": "C-1", "email": "old@example.com" }),
            )),
            &actor(),
        )
        .unwrap();
    assert_eq!(v1.version, 1);
    assert!(v1.is_current);
    assert!(v1.expired_at.is_none());

    let v2 = h
        .manager
        .update(
            v1.id,
            RecordPatch::with_data(payload(json!({ "email": "new@example.com" }))),
            &actor(),
        )
        .unwrap();

    // The successor is a distinct row at the next version.
    assert_ne!(v2.id, v1.id);
    assert_eq!(v2.version, 2);
    assert!(v2.is_current);
    assert_eq!(v2.data["email"], "new@example.com");
    assert_eq!(v2.data["customerCode"], "C-1");

    // The predecessor's payload is frozen; only its chain position
    // changed.
    let stored_v1 = h.manager.get(v1.id).unwrap();
    assert!(!stored_v1.is_current);
    assert!(stored_v1.expired_at.is_some());
    assert_eq!(stored_v1.data["email"], "old@example.com");
    assert_eq!(stored_v1.version, 1);

    let versions: Vec<u32> = h
        .manager
        .list_revisions(v2.id)
        .unwrap()
        .iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(versions, vec![2, 1]);
}

/// Creation stamps survive the whole chain; update stamps follow the
/// latest writer.
#[test]
fn test_creation_stamps_survive_revisions() {
    let h = harness();
    define_versioned_customer(&h);

    let v1 = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-1" }))),
            &actor(),
        )
        .unwrap();
    let v2 = h
        .manager
        .update(
            v1.id,
            RecordPatch::with_data(payload(json!({ "email": "a@a.com" }))),
            &Actor::new("op-2", "Second Operator"),
        )
        .unwrap();

    assert_eq!(v2.created_by, "op-1");
    assert_eq!(v2.created_at, v1.created_at);
    assert_eq!(v2.updated_by, "op-2");
}

/// History is queryable from any revision of the chain, not just the
/// current one.
#[test]
fn test_history_reachable_from_any_revision() {
    let h = harness();
    define_versioned_customer(&h);

    let v1 = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-1" }))),
            &actor(),
        )
        .unwrap();
    let v2 = h
        .manager
        .update(
            v1.id,
            RecordPatch::with_data(payload(json!({ "email": "a@a.com" }))),
            &actor(),
        )
        .unwrap();
    let v3 = h
        .manager
        .update(
            v2.id,
            RecordPatch::with_data(payload(json!({ "email": "b@b.com" }))),
            &actor(),
        )
        .unwrap();

    for id in [v1.id, v2.id, v3.id] {
        let versions: Vec<u32> = h
            .manager
            .list_revisions(id)
            .unwrap()
            .iter()
            .map(|r| r.version)
            .collect();
        assert_eq!(versions, vec![3, 2, 1]);
    }
}

/// Exactly one revision per chain is current, at every point.
#[test]
fn test_single_current_revision_per_chain() {
    let h = harness();
    define_versioned_customer(&h);

    let mut latest = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-1" }))),
            &actor(),
        )
        .unwrap();
    for i in 0..4 {
        latest = h
            .manager
            .update(
                latest.id,
                RecordPatch::with_data(payload(json!({ "email": format!("v{i}@x.io") }))),
                &actor(),
            )
            .unwrap();

        let revisions = h.manager.list_revisions(latest.id).unwrap();
        let current: Vec<_> = revisions.iter().filter(|r| r.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, latest.id);
        // Gapless, strictly decreasing version numbers.
        let versions: Vec<u32> = revisions.iter().map(|r| r.version).collect();
        let expected: Vec<u32> = (1..=latest.version).rev().collect();
        assert_eq!(versions, expected);
    }
}

/// Chains with different business keys never mix.
#[test]
fn test_chains_are_isolated_by_business_key() {
    let h = harness();
    define_versioned_customer(&h);

    let a = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-A" }))),
            &actor(),
        )
        .unwrap();
    let b = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-B" }))),
            &actor(),
        )
        .unwrap();
    h.manager
        .update(
            a.id,
            RecordPatch::with_data(payload(json!({ "email": "a@a.com" }))),
            &actor(),
        )
        .unwrap();

    let b_history = h.manager.list_revisions(b.id).unwrap();
    assert_eq!(b_history.len(), 1);
    assert_eq!(b_history[0].id, b.id);
}

// =============================================================================
// Chain Identity
// =============================================================================

/// A chain without any required-field values has no identity: the
/// update is refused before anything is retired.
#[test]
fn test_indeterminate_identity_refused_before_retire() {
    let h = harness();
    let mut config = RecordConfig::default();
    config.versioning.enabled = true;
    // No required fields at all: no business key can ever be derived.
    h.registry
        .create(
            DefinitionDraft::new("NOTE", "Note")
                .with_schema(
                    SchemaDefinition::new().with_property("body", FieldSchema::string()),
                )
                .with_record_config(config),
            &actor(),
        )
        .unwrap();

    let v1 = h
        .manager
        .create(
            "NOTE",
            NewRecord::with_data(payload(json!({ "body": "hello" }))),
            &actor(),
        )
        .unwrap();

    let err = h
        .manager
        .update(
            v1.id,
            RecordPatch::with_data(payload(json!({ "body": "edited" }))),
            &actor(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Versioning(VersioningError::IndeterminateIdentity(_))
    ));

    // Nothing was retired or inserted.
    let stored = h.manager.get(v1.id).unwrap();
    assert!(stored.is_current);
    assert_eq!(h.records.len(), 1);
}

// =============================================================================
// Concurrency
// =============================================================================

/// Two writers race to update the same current revision: exactly one
/// wins, the other sees a concurrent-modification failure, and the
/// chain ends up with exactly one current revision at version 2.
#[test]
fn test_racing_updates_have_exactly_one_winner() {
    let h = harness();
    define_versioned_customer(&h);

    let v1 = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-1" }))),
            &actor(),
        )
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..2 {
        let manager = h.manager.clone();
        let id = v1.id;
        handles.push(thread::spawn(move || {
            manager.update(
                id,
                RecordPatch::with_data(payload(json!({ "email": format!("w{i}@x.io") }))),
                &Actor::new(format!("writer-{i}"), "Writer"),
            )
        }));
    }

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser.as_ref().unwrap_err(),
        LifecycleError::Versioning(VersioningError::ConcurrentModification(_))
    ));

    // Exactly two revisions exist: the retired v1 and the winner's v2.
    assert_eq!(h.records.len(), 2);
    let winner = outcomes.iter().find(|r| r.is_ok()).unwrap().as_ref().unwrap();
    let revisions = h.manager.list_revisions(winner.id).unwrap();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].version, 2);
    assert!(revisions[0].is_current);
    assert!(!revisions[1].is_current);
}

/// Readers polling a chain while it is being revised always see
/// exactly one current revision: retirement of the predecessor and
/// insert of the successor are one store transition, never two
/// separately observable writes.
#[test]
fn test_readers_always_see_exactly_one_current_revision() {
    let h = harness();
    define_versioned_customer(&h);

    let v1 = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-1" }))),
            &actor(),
        )
        .unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let mut readers = Vec::new();
    for _ in 0..3 {
        let records = h.records.clone();
        let done = done.clone();
        readers.push(thread::spawn(move || {
            let mut torn_observations = 0usize;
            while !done.load(Ordering::Relaxed) {
                let revisions = records
                    .find("CUSTOMER", &[Predicate::eq("customerCode", json!("C-1"))])
                    .unwrap();
                let current = revisions.iter().filter(|r| r.is_current).count();
                if current != 1 {
                    torn_observations += 1;
                }
            }
            torn_observations
        }));
    }

    let mut latest = v1;
    for i in 0..50 {
        latest = h
            .manager
            .update(
                latest.id,
                RecordPatch::with_data(payload(json!({ "email": format!("v{i}@x.io") }))),
                &actor(),
            )
            .unwrap();
    }
    done.store(true, Ordering::Relaxed);

    for reader in readers {
        assert_eq!(reader.join().unwrap(), 0);
    }
    assert_eq!(latest.version, 51);
}

// =============================================================================
// Audit
// =============================================================================

/// Every revision transition is audited as a revision, distinct from
/// plain updates.
#[test]
fn test_revisions_are_audited_distinctly() {
    let h = harness();
    define_versioned_customer(&h);

    let v1 = h
        .manager
        .create(
            "CUSTOMER",
            NewRecord::with_data(payload(json!({ "customerCode": "C-1" }))),
            &actor(),
        )
        .unwrap();
    h.manager
        .update(
            v1.id,
            RecordPatch::with_data(payload(json!({ "email": "a@a.com" }))),
            &actor(),
        )
        .unwrap();

    assert_eq!(h.audit.actions(AuditAction::RecordCreated).len(), 1);
    assert_eq!(h.audit.actions(AuditAction::RecordRevised).len(), 1);
    assert!(h.audit.actions(AuditAction::RecordUpdated).is_empty());
}
