//! Audit log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Default number of entries returned by a query
pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;

/// Upper bound on entries returned by a query
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// Actor name stored when a change has no acting user
pub const SYSTEM_ACTOR: &str = "System";

/// Stored audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub username: String,
    pub action_type: String,
    pub target_resource: String,
    pub target_id: String,
    pub details: JsonValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Import,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Import => "IMPORT",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Ok(AuditAction::Create),
            "UPDATE" => Ok(AuditAction::Update),
            "DELETE" => Ok(AuditAction::Delete),
            "IMPORT" => Ok(AuditAction::Import),
            _ => Err(format!("Invalid audit action: {s}")),
        }
    }
}

/// Resource tag written with each entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Device,
    Employee,
    Line,
    Record,
    Maintenance,
    LineTerm,
    User,
    Company,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Device => "Device",
            ResourceType::Employee => "Employee",
            ResourceType::Line => "Line",
            ResourceType::Record => "Record",
            ResourceType::Maintenance => "Maintenance",
            ResourceType::LineTerm => "LineTerm",
            ResourceType::User => "User",
            ResourceType::Company => "Company",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row written to the audit log
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: Option<i64>,
    pub username: String,
    pub action: AuditAction,
    pub resource: ResourceType,
    pub target_id: String,
    pub details: JsonValue,
}

/// Filters for browsing the audit log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<i64>,
    pub action: Option<AuditAction>,
    /// Raw tag, since entries may carry tags outside [`ResourceType`]
    pub resource: Option<String>,
    pub target_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_AUDIT_QUERY_LIMIT)
            .clamp(1, MAX_AUDIT_QUERY_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err("start_time must not be after end_time".to_string());
            }
        }
        Ok(())
    }
}
