//! Delete line command

use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::{constraint_violation, ConstraintViolation};

#[derive(Debug, thiserror::Error)]
pub enum DeleteLineError {
    #[error("Line {0} not found")]
    NotFound(i64),

    #[error("Line {0} is linked to a device or line term and cannot be deleted")]
    HasDependencies(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteLineError> for AppError {
    fn from(err: DeleteLineError) -> Self {
        match err {
            DeleteLineError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteLineError::HasDependencies(_) => AppError::Conflict(err.to_string()),
            DeleteLineError::Database(e) => AppError::Database(e),
        }
    }
}

/// Returns the number of the removed line
#[tracing::instrument(skip(pool, recorder, principal))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
) -> Result<String, DeleteLineError> {
    let mut tx = pool.begin().await?;
    let number: String = sqlx::query_scalar("DELETE FROM lines WHERE id = $1 RETURNING number")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match constraint_violation(&e) {
            Some(ConstraintViolation::ForeignKey) => DeleteLineError::HasDependencies(id),
            _ => DeleteLineError::Database(e),
        })?
        .ok_or(DeleteLineError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(line_id = id, "Line deleted");

    recorder
        .record(
            AuditEvent::new(AuditAction::Delete, ResourceType::Line, id)
                .by(principal)
                .details(&json!({ "message": format!("Line {number} deleted") })),
        )
        .await;

    Ok(number)
}
