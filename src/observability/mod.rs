//! Observability: structured logging and the audit side-channel.
//!
//! Principles:
//! 1. Observability is read-only; no side effects on engine decisions.
//! 2. Synchronous, no background threads.
//! 3. Deterministic output (stable key ordering).
//!
//! The audit log is an injected recorder, not ambient global state:
//! the registry, lifecycle manager and versioning engine each hold an
//! `Arc<dyn AuditLog>` handed to them at construction.

mod audit;
mod logger;

pub use audit::{
    AuditAction, AuditLog, AuditOutcome, AuditRecord, FileAuditLog, MemoryAuditLog,
};
pub use logger::{Logger, Severity};
