//! Best-effort audit recording
//!
//! Handlers call [`AuditRecorder::record`] after their own transaction has
//! committed. The write goes through the [`AuditSink`] on a separate
//! connection, so a failed audit write can never undo the change it
//! describes. Failures are logged at error level and swallowed, and there is
//! a single attempt per call.

use super::models::{AuditAction, AuditEntry, NewAuditEntry, ResourceType, SYSTEM_ACTOR};
use super::queries;
use crate::access::Principal;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum AuditWriteError {
    #[error("Audit store write failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Audit store unavailable: {0}")]
    Unavailable(String),
}

/// Durable destination for audit entries
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuditWriteError>;
}

/// Appends to the `audit_log` table using its own pooled connection
#[derive(Debug, Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuditWriteError> {
        Ok(queries::insert_entry(&self.pool, &entry).await?)
    }
}

/// Description of one completed mutation
#[derive(Debug)]
pub struct AuditEvent {
    actor_id: Option<i64>,
    actor_name: Option<String>,
    action: AuditAction,
    resource: ResourceType,
    target_id: String,
    details: Result<JsonValue, serde_json::Error>,
}

impl AuditEvent {
    /// A system-initiated event with empty details
    pub fn new(action: AuditAction, resource: ResourceType, target_id: impl fmt::Display) -> Self {
        Self {
            actor_id: None,
            actor_name: None,
            action,
            resource,
            target_id: target_id.to_string(),
            details: Ok(JsonValue::Object(Default::default())),
        }
    }

    pub fn by(self, principal: &Principal) -> Self {
        self.actor(Some(principal.id), Some(principal.display_name.clone()))
    }

    pub fn actor(mut self, id: Option<i64>, name: Option<String>) -> Self {
        self.actor_id = id;
        self.actor_name = name;
        self
    }

    /// Attach a details payload; serialization errors surface when recording
    pub fn details<D: Serialize + ?Sized>(mut self, details: &D) -> Self {
        self.details = serde_json::to_value(details);
        self
    }
}

#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(Arc::new(PgAuditSink::new(pool)))
    }

    /// Write one entry, returning it when the write succeeded
    ///
    /// Never fails from the caller's point of view.
    pub async fn record(&self, event: AuditEvent) -> Option<AuditEntry> {
        let AuditEvent {
            actor_id,
            actor_name,
            action,
            resource,
            target_id,
            details,
        } = event;

        let username = actor_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| SYSTEM_ACTOR.to_string());

        let details = match details {
            Ok(details) => details,
            Err(err) => {
                error!(
                    error = %err,
                    %action,
                    %resource,
                    target_id = %target_id,
                    "Failed to serialize audit details"
                );
                return None;
            },
        };

        let entry = NewAuditEntry {
            user_id: actor_id,
            username,
            action,
            resource,
            target_id,
            details,
        };

        match self.sink.append(entry.clone()).await {
            Ok(stored) => {
                info!(
                    audit_id = stored.id,
                    "AUDIT LOG: User '{}' performed {} on {} '{}'",
                    stored.username,
                    stored.action_type,
                    stored.target_resource,
                    stored.target_id
                );
                Some(stored)
            },
            Err(err) => {
                error!(
                    error = %err,
                    user = %entry.username,
                    action = %entry.action,
                    resource = %entry.resource,
                    target_id = %entry.target_id,
                    "Failed to write audit entry"
                );
                None
            },
        }
    }
}

impl fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}
