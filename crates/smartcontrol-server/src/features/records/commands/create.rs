//! Deliver a device to an employee

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::records::models::{self, AssignmentRecord};
use crate::features::shared::{
    constraint_violation, optional_text, required_text, ConstraintViolation, ValidationError,
    MAX_TEXT_LENGTH,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordCommand {
    pub employee_registration: Option<String>,
    pub device_imei: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_condition: Option<String>,
    pub delivery_notes: Option<String>,
    #[serde(default)]
    pub accessories: Vec<String>,
    pub delivery_term_url: Option<String>,
    pub delivery_checker: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Delivery {
    registration: String,
    imei: String,
    date: NaiveDate,
    condition: Option<String>,
    notes: Option<String>,
    accessories: Vec<String>,
    term_url: Option<String>,
    checker: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateRecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Device with IMEI '{0}' not found")]
    DeviceNotFound(String),

    #[error("Employee with registration '{0}' not found")]
    EmployeeNotFound(String),

    #[error("This device is already assigned under term #{0}")]
    DeviceInUse(i64),

    #[error("This device is already assigned")]
    AlreadyAssigned,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateRecordError> for AppError {
    fn from(err: CreateRecordError) -> Self {
        match err {
            CreateRecordError::Validation(e) => e.into(),
            CreateRecordError::DeviceNotFound(_) | CreateRecordError::EmployeeNotFound(_) => {
                AppError::NotFound(err.to_string())
            },
            CreateRecordError::DeviceInUse(_) | CreateRecordError::AlreadyAssigned => {
                AppError::Conflict(err.to_string())
            },
            CreateRecordError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateRecordCommand {
    fn validate(&self) -> Result<Delivery, ValidationError> {
        Ok(Delivery {
            registration: required_text(
                "employeeRegistration",
                self.employee_registration.as_deref(),
                64,
            )?,
            imei: required_text("deviceImei", self.device_imei.as_deref(), 32)?,
            date: self
                .delivery_date
                .ok_or(ValidationError::Required("deliveryDate"))?,
            condition: optional_text(
                "deliveryCondition",
                self.delivery_condition.as_deref(),
                MAX_TEXT_LENGTH,
            )?,
            notes: optional_text("deliveryNotes", self.delivery_notes.as_deref(), 2000)?,
            accessories: self
                .accessories
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect(),
            term_url: optional_text("deliveryTermUrl", self.delivery_term_url.as_deref(), 1024)?,
            checker: optional_text(
                "deliveryChecker",
                self.delivery_checker.as_deref(),
                MAX_TEXT_LENGTH,
            )?,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command), fields(imei = ?command.device_imei))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: CreateRecordCommand,
) -> Result<AssignmentRecord, CreateRecordError> {
    let delivery = command.validate()?;

    let mut tx = pool.begin().await?;

    let device_id: i64 = sqlx::query_scalar("SELECT id FROM devices WHERE imei1 = $1 FOR UPDATE")
        .bind(&delivery.imei)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CreateRecordError::DeviceNotFound(delivery.imei.clone()))?;

    let active: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM assignment_records WHERE device_id = $1 AND status = 'In use'",
    )
    .bind(device_id)
    .fetch_optional(&mut *tx)
    .await?;
    if let Some(record_id) = active {
        return Err(CreateRecordError::DeviceInUse(record_id));
    }

    let employee_id: i64 = sqlx::query_scalar("SELECT id FROM employees WHERE registration = $1")
        .bind(&delivery.registration)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CreateRecordError::EmployeeNotFound(delivery.registration.clone()))?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO assignment_records (
            employee_id, device_id, status, delivery_date, delivery_condition,
            delivery_notes, accessories, delivery_term_url, delivery_checker
        )
        VALUES ($1, $2, 'In use', $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(employee_id)
    .bind(device_id)
    .bind(delivery.date)
    .bind(&delivery.condition)
    .bind(&delivery.notes)
    .bind(sqlx::types::Json(&delivery.accessories))
    .bind(&delivery.term_url)
    .bind(&delivery.checker)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => CreateRecordError::AlreadyAssigned,
        _ => CreateRecordError::Database(e),
    })?;

    let record = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    tx.commit().await?;

    tracing::info!(record_id = id, device_id, employee_id, "Device delivered");

    recorder
        .record(
            AuditEvent::new(AuditAction::Create, ResourceType::Record, &record.device_imei)
                .by(principal)
                .details(&json!({
                    "message": format!(
                        "Device {} delivered to {}",
                        record.device_imei, record.employee_name
                    ),
                    "recordId": id,
                })),
        )
        .await;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CreateRecordCommand {
        serde_json::from_value(json!({
            "employeeRegistration": "1001",
            "deviceImei": "351234567890123",
            "deliveryDate": "2026-03-02",
            "accessories": ["Charger", " ", "Case"],
            "currentUser": { "id": 7 }
        }))
        .unwrap()
    }

    #[test]
    fn test_validation_success() {
        let delivery = command().validate().unwrap();
        assert_eq!(delivery.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(delivery.accessories, vec!["Charger".to_string(), "Case".to_string()]);
    }

    #[test]
    fn test_required_fields() {
        let cmd = CreateRecordCommand {
            delivery_date: None,
            ..command()
        };
        assert_eq!(cmd.validate(), Err(ValidationError::Required("deliveryDate")));

        let cmd = CreateRecordCommand {
            device_imei: None,
            ..command()
        };
        assert_eq!(cmd.validate(), Err(ValidationError::Required("deviceImei")));
    }

    #[test]
    fn test_error_mapping() {
        use axum::http::StatusCode;

        let err: AppError = CreateRecordError::DeviceInUse(4).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        let err: AppError = CreateRecordError::EmployeeNotFound("1".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
