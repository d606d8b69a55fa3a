//! Delete employee command

use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::{constraint_violation, ConstraintViolation};

#[derive(Debug, thiserror::Error)]
pub enum DeleteEmployeeError {
    #[error("Employee {0} not found")]
    NotFound(i64),

    #[error("Employee {0} is referenced by device or line terms and cannot be deleted")]
    HasDependencies(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteEmployeeError> for AppError {
    fn from(err: DeleteEmployeeError) -> Self {
        match err {
            DeleteEmployeeError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteEmployeeError::HasDependencies(_) => AppError::Conflict(err.to_string()),
            DeleteEmployeeError::Database(e) => AppError::Database(e),
        }
    }
}

/// Returns the name of the removed employee
#[tracing::instrument(skip(pool, recorder, principal))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
) -> Result<String, DeleteEmployeeError> {
    let mut tx = pool.begin().await?;
    let name: String = sqlx::query_scalar("DELETE FROM employees WHERE id = $1 RETURNING name")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match constraint_violation(&e) {
            Some(ConstraintViolation::ForeignKey) => DeleteEmployeeError::HasDependencies(id),
            _ => DeleteEmployeeError::Database(e),
        })?
        .ok_or(DeleteEmployeeError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(employee_id = id, "Employee deleted");

    recorder
        .record(
            AuditEvent::new(AuditAction::Delete, ResourceType::Employee, id)
                .by(principal)
                .details(&json!({ "message": format!("Employee {name} deleted") })),
        )
        .await;

    Ok(name)
}
