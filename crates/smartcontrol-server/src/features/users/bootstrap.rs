//! First administrator
//!
//! With an empty `users` table nobody can pass the access guard, so startup
//! creates an administrator from `BOOTSTRAP_ADMIN_USERNAME` and
//! `BOOTSTRAP_ADMIN_PASSWORD` when both are set.

use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;

use super::password::{self, PasswordError};
use crate::access::{PermissionSet, ADMINISTRATOR_ROLE};
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::config::BootstrapConfig;

pub const BOOTSTRAP_ADMIN_NAME: &str = "Administrator";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Returns the id of the created administrator, if one was created
#[tracing::instrument(skip_all)]
pub async fn bootstrap_admin(
    pool: &PgPool,
    recorder: &AuditRecorder,
    config: &BootstrapConfig,
) -> Result<Option<i64>, BootstrapError> {
    let (Some(username), Some(plain)) = (
        config.admin_username.as_deref().map(str::trim).filter(|u| !u.is_empty()),
        config.admin_password.clone().filter(|p| !p.is_empty()),
    ) else {
        tracing::debug!("No bootstrap administrator configured");
        return Ok(None);
    };

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::debug!(existing, "Users present, skipping bootstrap administrator");
        return Ok(None);
    }

    let password_hash = password::hash(plain).await?;
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO users (name, username, password_hash, role, permissions) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (username) DO NOTHING \
         RETURNING id",
    )
    .bind(BOOTSTRAP_ADMIN_NAME)
    .bind(username)
    .bind(&password_hash)
    .bind(ADMINISTRATOR_ROLE)
    .bind(PermissionSet::new().to_json())
    .fetch_optional(pool)
    .await?;

    if let Some(id) = id {
        tracing::info!(user_id = id, username, "Bootstrap administrator created");
        recorder
            .record(
                AuditEvent::new(AuditAction::Create, ResourceType::User, username)
                    .details(&json!({ "message": "Bootstrap administrator created" })),
            )
            .await;
    }

    Ok(id)
}
