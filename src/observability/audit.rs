//! Append-only audit trail for definition and record mutations.
//!
//! Every mutating operation appends one record: what happened, who did
//! it, what it targeted, how it ended. The trail also carries flags
//! for tolerated-but-notable input, such as a stripped attempt to
//! change a definition's immutable code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::access::Actor;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    DefinitionCreated,
    DefinitionUpdated,
    DefinitionToggled,
    DefinitionDeleted,
    /// An update patch carried a new `code`; the change was stripped
    /// as a no-op and flagged here.
    CodeChangeStripped,
    RecordCreated,
    RecordUpdated,
    /// A versioned update: new revision inserted, predecessor retired.
    RecordRevised,
    RecordActivationToggled,
    RecordDeleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::DefinitionCreated => "DEFINITION_CREATED",
            AuditAction::DefinitionUpdated => "DEFINITION_UPDATED",
            AuditAction::DefinitionToggled => "DEFINITION_TOGGLED",
            AuditAction::DefinitionDeleted => "DEFINITION_DELETED",
            AuditAction::CodeChangeStripped => "CODE_CHANGE_STRIPPED",
            AuditAction::RecordCreated => "RECORD_CREATED",
            AuditAction::RecordUpdated => "RECORD_UPDATED",
            AuditAction::RecordRevised => "RECORD_REVISED",
            AuditAction::RecordActivationToggled => "RECORD_ACTIVATION_TOGGLED",
            AuditAction::RecordDeleted => "RECORD_DELETED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Success,
    Rejected,
}

/// One audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    /// Actor identity as stamped onto the mutated row.
    pub actor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditRecord {
    pub fn new(action: AuditAction, outcome: AuditOutcome, actor: &Actor) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            outcome,
            actor_id: actor.id.clone(),
            definition_code: None,
            record_id: None,
            detail: None,
        }
    }

    /// Shorthand for the common successful case.
    pub fn success(action: AuditAction, actor: &Actor) -> Self {
        Self::new(action, AuditOutcome::Success, actor)
    }

    pub fn with_definition(mut self, code: impl Into<String>) -> Self {
        self.definition_code = Some(code.into());
        self
    }

    pub fn with_record(mut self, id: Uuid) -> Self {
        self.record_id = Some(id);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Encodes the entry as one JSON line.
    pub fn to_json(&self) -> String {
        // Field order is the struct declaration order; serde_json keeps
        // it stable.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Injected audit recorder.
///
/// Append must be synchronous: the entry is visible once the call
/// returns. Failures never veto the operation being audited.
pub trait AuditLog: Send + Sync {
    fn append(&self, record: &AuditRecord) -> io::Result<()>;
}

/// Append-only JSONL file, fsynced per append.
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileAuditLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, record: &AuditRecord) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{}", record.to_json())?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

/// In-memory audit log for tests and embedded use.
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    /// All entries for one action, in append order.
    pub fn actions(&self, action: AuditAction) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.action == action)
            .cloned()
            .collect()
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> io::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
