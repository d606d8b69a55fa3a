//! Audit trail of administrative changes
//!
//! - [`recorder`] appends one entry per committed mutation, best effort
//! - [`queries`] reads the trail back for the audit routes
//!
//! Entries are append-only; the schema rejects updates and deletes on
//! `audit_log`.

pub mod models;
pub mod queries;
pub mod recorder;

pub use models::{
    AuditAction, AuditEntry, AuditQuery, NewAuditEntry, ResourceType, DEFAULT_AUDIT_QUERY_LIMIT,
    MAX_AUDIT_QUERY_LIMIT, SYSTEM_ACTOR,
};
pub use recorder::{AuditEvent, AuditRecorder, AuditSink, AuditWriteError, PgAuditSink};
