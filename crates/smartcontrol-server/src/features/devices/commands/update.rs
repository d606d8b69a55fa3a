//! Update device command
//!
//! The first IMEI is the device's key and cannot change. All other fields
//! are replaced.

use serde::{Deserialize, Serialize};
use serde_json::json;
use smartcontrol_common::types::DeviceCondition;
use sqlx::PgPool;

use super::create::MAX_IMEI_LENGTH;
use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::devices::models::{self, Device};
use crate::features::shared::{
    constraint_violation, optional_text, required_choice, required_text, ConstraintViolation,
    ValidationError, MAX_TEXT_LENGTH,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceCommand {
    /// Taken from the path
    #[serde(skip)]
    pub imei: String,
    pub model: Option<String>,
    pub imei2: Option<String>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub line_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
struct DeviceChanges {
    model: String,
    imei2: Option<String>,
    condition: DeviceCondition,
    notes: Option<String>,
    line_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateDeviceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Device with IMEI '{0}' not found")]
    NotFound(String),

    #[error("Line {0} does not exist")]
    LineNotFound(i64),

    #[error("Stored device data is invalid: {0}")]
    Corrupt(#[from] smartcontrol_common::CommonError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateDeviceError> for AppError {
    fn from(err: UpdateDeviceError) -> Self {
        match err {
            UpdateDeviceError::Validation(e) => e.into(),
            UpdateDeviceError::NotFound(_) | UpdateDeviceError::LineNotFound(_) => {
                AppError::NotFound(err.to_string())
            },
            UpdateDeviceError::Corrupt(e) => AppError::Internal(e.to_string()),
            UpdateDeviceError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateDeviceCommand {
    fn validate(&self) -> Result<DeviceChanges, ValidationError> {
        Ok(DeviceChanges {
            model: required_text("model", self.model.as_deref(), MAX_TEXT_LENGTH)?,
            imei2: optional_text("imei2", self.imei2.as_deref(), MAX_IMEI_LENGTH)?,
            condition: required_choice("condition", self.condition.as_deref())?,
            notes: optional_text("notes", self.notes.as_deref(), MAX_TEXT_LENGTH)?,
            line_id: self.line_id,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command), fields(imei = %command.imei))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: UpdateDeviceCommand,
) -> Result<Device, UpdateDeviceError> {
    let changes = command.validate()?;
    let imei = command.imei;

    let mut tx = pool.begin().await?;

    let old = models::find_by_imei(&mut *tx, &imei)
        .await?
        .ok_or_else(|| UpdateDeviceError::NotFound(imei.clone()))?;
    let old = Device::try_from(old)?;

    sqlx::query(
        r#"
        UPDATE devices
        SET model = $1, imei2 = $2, condition = $3, notes = $4, line_id = $5
        WHERE id = $6
        "#,
    )
    .bind(&changes.model)
    .bind(&changes.imei2)
    .bind(changes.condition.as_str())
    .bind(&changes.notes)
    .bind(changes.line_id)
    .bind(old.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::ForeignKey) => {
            UpdateDeviceError::LineNotFound(changes.line_id.unwrap_or_default())
        },
        _ => UpdateDeviceError::Database(e),
    })?;

    let row = models::find_by_id(&mut *tx, old.id)
        .await?
        .ok_or_else(|| UpdateDeviceError::NotFound(imei.clone()))?;
    tx.commit().await?;

    let device = Device::try_from(row)?;
    tracing::info!(device_id = device.id, "Device updated");

    recorder
        .record(
            AuditEvent::new(AuditAction::Update, ResourceType::Device, &imei)
                .by(principal)
                .details(&json!({
                    "message": "Device updated",
                    "oldData": &old,
                    "newData": &device,
                })),
        )
        .await;

    Ok(device)
}
