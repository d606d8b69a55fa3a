//! Delete assignment record command

use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum DeleteRecordError {
    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteRecordError> for AppError {
    fn from(err: DeleteRecordError) -> Self {
        match err {
            DeleteRecordError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteRecordError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, recorder, principal))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
) -> Result<(), DeleteRecordError> {
    let mut tx = pool.begin().await?;
    let deleted = sqlx::query("DELETE FROM assignment_records WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(DeleteRecordError::NotFound(id));
    }
    tx.commit().await?;

    tracing::info!(record_id = id, "Record deleted");

    recorder
        .record(
            AuditEvent::new(AuditAction::Delete, ResourceType::Record, id)
                .by(principal)
                .details(&json!({ "message": format!("Term {id} deleted") })),
        )
        .await;

    Ok(())
}
