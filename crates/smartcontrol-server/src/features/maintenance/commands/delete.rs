//! Delete a service order

use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum DeleteMaintenanceError {
    #[error("Maintenance order {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteMaintenanceError> for AppError {
    fn from(err: DeleteMaintenanceError) -> Self {
        match err {
            DeleteMaintenanceError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteMaintenanceError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, recorder, principal))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
) -> Result<(), DeleteMaintenanceError> {
    let mut tx = pool.begin().await?;
    let device_id: i64 =
        sqlx::query_scalar("DELETE FROM maintenance_orders WHERE id = $1 RETURNING device_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DeleteMaintenanceError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(order_id = id, "Maintenance order deleted");

    recorder
        .record(
            AuditEvent::new(AuditAction::Delete, ResourceType::Maintenance, id)
                .by(principal)
                .details(&json!({ "deviceId": device_id })),
        )
        .await;

    Ok(())
}
