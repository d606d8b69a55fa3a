//! Create device command

use serde::{Deserialize, Serialize};
use serde_json::json;
use smartcontrol_common::types::DeviceCondition;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::devices::models::{self, Device};
use crate::features::shared::{
    constraint_violation, optional_text, required_choice, required_text, ConstraintViolation,
    ValidationError, MAX_TEXT_LENGTH,
};

/// IMEIs are 15 digits, but dual-SIM and legacy serials vary
pub const MAX_IMEI_LENGTH: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceCommand {
    pub model: Option<String>,
    pub imei1: Option<String>,
    pub imei2: Option<String>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub line_id: Option<i64>,
}

/// Validated device fields shared by the create and import paths
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub model: String,
    pub imei1: String,
    pub imei2: Option<String>,
    pub condition: DeviceCondition,
    pub notes: Option<String>,
    pub line_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDeviceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IMEI {0} is already registered")]
    DuplicateImei(String),

    #[error("Line {0} does not exist")]
    LineNotFound(i64),

    #[error("Stored device data is invalid: {0}")]
    Corrupt(#[from] smartcontrol_common::CommonError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateDeviceError> for AppError {
    fn from(err: CreateDeviceError) -> Self {
        match err {
            CreateDeviceError::Validation(e) => e.into(),
            CreateDeviceError::DuplicateImei(_) => AppError::Conflict(err.to_string()),
            CreateDeviceError::LineNotFound(_) => AppError::NotFound(err.to_string()),
            CreateDeviceError::Corrupt(e) => AppError::Internal(e.to_string()),
            CreateDeviceError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateDeviceCommand {
    pub fn validate(&self) -> Result<NewDevice, ValidationError> {
        Ok(NewDevice {
            model: required_text("model", self.model.as_deref(), MAX_TEXT_LENGTH)?,
            imei1: required_text("imei1", self.imei1.as_deref(), MAX_IMEI_LENGTH)?,
            imei2: optional_text("imei2", self.imei2.as_deref(), MAX_IMEI_LENGTH)?,
            condition: required_choice("condition", self.condition.as_deref())?,
            notes: optional_text("notes", self.notes.as_deref(), MAX_TEXT_LENGTH)?,
            line_id: self.line_id,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command), fields(imei = ?command.imei1))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: CreateDeviceCommand,
) -> Result<Device, CreateDeviceError> {
    let input = command.validate()?;

    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO devices (model, imei1, imei2, condition, notes, line_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&input.model)
    .bind(&input.imei1)
    .bind(&input.imei2)
    .bind(input.condition.as_str())
    .bind(&input.notes)
    .bind(input.line_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => CreateDeviceError::DuplicateImei(input.imei1.clone()),
        Some(ConstraintViolation::ForeignKey) => {
            CreateDeviceError::LineNotFound(input.line_id.unwrap_or_default())
        },
        _ => CreateDeviceError::Database(e),
    })?;

    let row = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    tx.commit().await?;

    let device = Device::try_from(row)?;
    tracing::info!(device_id = device.id, imei = %device.imei1, "Device created");

    recorder
        .record(
            AuditEvent::new(AuditAction::Create, ResourceType::Device, &device.imei1)
                .by(principal)
                .details(&json!({
                    "message": format!("Device created: {}", device.model),
                    "data": &device,
                })),
        )
        .await;

    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CreateDeviceCommand {
        CreateDeviceCommand {
            model: Some("Galaxy A54".into()),
            imei1: Some("351234567890123".into()),
            imei2: Some("".into()),
            condition: Some("new".into()),
            notes: None,
            line_id: None,
        }
    }

    #[test]
    fn test_validation_success() {
        let input = command().validate().unwrap();
        assert_eq!(input.condition, DeviceCondition::New);
        assert_eq!(input.imei2, None);
    }

    #[test]
    fn test_required_fields() {
        for cmd in [
            CreateDeviceCommand { model: None, ..command() },
            CreateDeviceCommand { imei1: Some("  ".into()), ..command() },
            CreateDeviceCommand { condition: None, ..command() },
        ] {
            assert!(matches!(cmd.validate(), Err(ValidationError::Required(_))));
        }
    }

    #[test]
    fn test_unknown_condition() {
        let cmd = CreateDeviceCommand {
            condition: Some("Broken".into()),
            ..command()
        };
        assert!(matches!(cmd.validate(), Err(ValidationError::Invalid { field: "condition", .. })));
    }

    #[test]
    fn test_error_mapping() {
        let err: AppError = CreateDeviceError::DuplicateImei("123".into()).into();
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);

        let err: AppError = CreateDeviceError::LineNotFound(9).into();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
