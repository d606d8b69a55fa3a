//! Delete a user

use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;

/// The primary administrator, which cannot be deleted
pub const PRIMARY_ADMIN_ID: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum DeleteUserError {
    #[error("The primary administrator cannot be deleted")]
    PrimaryAdministrator,

    #[error("User {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteUserError> for AppError {
    fn from(err: DeleteUserError) -> Self {
        match err {
            DeleteUserError::PrimaryAdministrator => AppError::Forbidden(err.to_string()),
            DeleteUserError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteUserError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, recorder, principal))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
) -> Result<String, DeleteUserError> {
    if id == PRIMARY_ADMIN_ID {
        return Err(DeleteUserError::PrimaryAdministrator);
    }

    let mut tx = pool.begin().await?;
    let username: String = sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING username")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DeleteUserError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(user_id = id, username = %username, "User deleted");

    recorder
        .record(
            AuditEvent::new(AuditAction::Delete, ResourceType::User, id)
                .by(principal)
                .details(&json!({ "message": format!("User {username} deleted") })),
        )
        .await;

    Ok(username)
}
