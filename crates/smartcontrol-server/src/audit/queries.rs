//! Database queries for the audit log

use super::models::{AuditEntry, AuditQuery, NewAuditEntry};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

const ENTRY_COLUMNS: &str =
    "id, timestamp, user_id, username, action_type, target_resource, target_id, details";

/// Append one entry and return it with its id and timestamp
pub async fn insert_entry(pool: &PgPool, entry: &NewAuditEntry) -> Result<AuditEntry, sqlx::Error> {
    let sql = format!(
        "INSERT INTO audit_log (user_id, username, action_type, target_resource, target_id, details) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {ENTRY_COLUMNS}"
    );

    let record = sqlx::query_as::<_, AuditEntry>(&sql)
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(entry.action.as_str())
        .bind(entry.resource.as_str())
        .bind(&entry.target_id)
        .bind(&entry.details)
        .fetch_one(pool)
        .await?;

    debug!(audit_id = record.id, action = %entry.action, resource = %entry.resource, "Created audit entry");

    Ok(record)
}

/// Entries for one resource instance, newest first
pub async fn trail_for(
    pool: &PgPool,
    resource: &str,
    target_id: &str,
    limit: i64,
) -> Result<Vec<AuditEntry>, sqlx::Error> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM audit_log \
         WHERE target_resource = $1 AND target_id = $2 \
         ORDER BY timestamp DESC, id DESC \
         LIMIT $3"
    );

    sqlx::query_as::<_, AuditEntry>(&sql)
        .bind(resource)
        .bind(target_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Filtered browse over the whole log, newest first
pub async fn search(pool: &PgPool, query: &AuditQuery) -> Result<Vec<AuditEntry>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM audit_log WHERE TRUE"));

    if let Some(user_id) = query.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(action) = query.action {
        builder.push(" AND action_type = ").push_bind(action.as_str());
    }
    if let Some(resource) = &query.resource {
        builder.push(" AND target_resource = ").push_bind(resource.clone());
    }
    if let Some(target_id) = &query.target_id {
        builder.push(" AND target_id = ").push_bind(target_id.clone());
    }
    if let Some(start) = query.start_time {
        builder.push(" AND timestamp >= ").push_bind(start);
    }
    if let Some(end) = query.end_time {
        builder.push(" AND timestamp <= ").push_bind(end);
    }

    builder
        .push(" ORDER BY timestamp DESC, id DESC LIMIT ")
        .push_bind(query.limit())
        .push(" OFFSET ")
        .push_bind(query.offset());

    builder.build_query_as::<AuditEntry>().fetch_all(pool).await
}
