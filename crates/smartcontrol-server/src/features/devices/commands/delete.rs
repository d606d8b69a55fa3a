//! Delete device command

use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::{constraint_violation, ConstraintViolation};

#[derive(Debug, Clone, Serialize)]
pub struct DeleteDeviceResponse {
    pub imei: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteDeviceError {
    #[error("Device with IMEI '{0}' not found")]
    NotFound(String),

    #[error("Device '{0}' has assignment or maintenance records and cannot be deleted")]
    HasDependencies(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteDeviceError> for AppError {
    fn from(err: DeleteDeviceError) -> Self {
        match err {
            DeleteDeviceError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteDeviceError::HasDependencies(_) => AppError::Conflict(err.to_string()),
            DeleteDeviceError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, recorder, principal))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    imei: String,
) -> Result<DeleteDeviceResponse, DeleteDeviceError> {
    let mut tx = pool.begin().await?;

    let model: Option<String> =
        sqlx::query_scalar("DELETE FROM devices WHERE imei1 = $1 RETURNING model")
            .bind(&imei)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintViolation::ForeignKey) => {
                    DeleteDeviceError::HasDependencies(imei.clone())
                },
                _ => DeleteDeviceError::Database(e),
            })?;
    let model = model.ok_or_else(|| DeleteDeviceError::NotFound(imei.clone()))?;

    tx.commit().await?;
    tracing::info!(imei = %imei, "Device deleted");

    let message = format!("Device {model} deleted");
    recorder
        .record(
            AuditEvent::new(AuditAction::Delete, ResourceType::Device, &imei)
                .by(principal)
                .details(&json!({ "message": &message })),
        )
        .await;

    Ok(DeleteDeviceResponse { imei, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_mapping() {
        let err: AppError = DeleteDeviceError::HasDependencies("1".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        let err: AppError = DeleteDeviceError::NotFound("1".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
