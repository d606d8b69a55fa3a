//! Open a service order

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use smartcontrol_common::types::DeviceCondition;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::maintenance::models::{self, order_number, MaintenanceOrder};
use crate::features::shared::{
    constraint_violation, optional_text, required_text, ConstraintViolation, ValidationError,
    MAX_TEXT_LENGTH,
};

/// Serializes order numbering across concurrent requests
const ORDER_NUMBER_LOCK: i64 = 0x534f_4e55_4d42;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceCommand {
    pub device_imei: Option<String>,
    pub sent_date: Option<NaiveDate>,
    pub reported_defect: Option<String>,
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct NewOrder {
    imei: String,
    sent_date: NaiveDate,
    reported_defect: String,
    supplier: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateMaintenanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Device with IMEI '{0}' not found")]
    DeviceNotFound(String),

    #[error("Order number {0} was taken concurrently, please retry")]
    NumberTaken(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateMaintenanceError> for AppError {
    fn from(err: CreateMaintenanceError) -> Self {
        match err {
            CreateMaintenanceError::Validation(e) => e.into(),
            CreateMaintenanceError::DeviceNotFound(_) => AppError::NotFound(err.to_string()),
            CreateMaintenanceError::NumberTaken(_) => AppError::Conflict(err.to_string()),
            CreateMaintenanceError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateMaintenanceCommand {
    fn validate(&self) -> Result<NewOrder, ValidationError> {
        Ok(NewOrder {
            imei: required_text("deviceImei", self.device_imei.as_deref(), 32)?,
            sent_date: self.sent_date.ok_or(ValidationError::Required("sentDate"))?,
            reported_defect: required_text("reportedDefect", self.reported_defect.as_deref(), 2000)?,
            supplier: optional_text("supplier", self.supplier.as_deref(), MAX_TEXT_LENGTH)?,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command), fields(imei = ?command.device_imei))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: CreateMaintenanceCommand,
) -> Result<MaintenanceOrder, CreateMaintenanceError> {
    let input = command.validate()?;

    let mut tx = pool.begin().await?;

    let device_id: i64 = sqlx::query_scalar("SELECT id FROM devices WHERE imei1 = $1 FOR UPDATE")
        .bind(&input.imei)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CreateMaintenanceError::DeviceNotFound(input.imei.clone()))?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ORDER_NUMBER_LOCK)
        .execute(&mut *tx)
        .await?;

    let year = Utc::now().year();
    // next after the highest sequence so deleted orders never free a number
    let highest: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(MAX(SUBSTRING(order_number FROM '^SO-[0-9]+-([0-9]+)$')::BIGINT), 0)
        FROM maintenance_orders
        WHERE order_number LIKE $1
        "#,
    )
    .bind(format!("SO-{year}-%"))
    .fetch_one(&mut *tx)
    .await?;
    let number = order_number(year, highest + 1);

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO maintenance_orders (order_number, device_id, sent_date, reported_defect, supplier, status)
        VALUES ($1, $2, $3, $4, $5, 'Open')
        RETURNING id
        "#,
    )
    .bind(&number)
    .bind(device_id)
    .bind(input.sent_date)
    .bind(&input.reported_defect)
    .bind(&input.supplier)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => CreateMaintenanceError::NumberTaken(number.clone()),
        _ => CreateMaintenanceError::Database(e),
    })?;

    sqlx::query("UPDATE devices SET condition = $1 WHERE id = $2")
        .bind(DeviceCondition::InMaintenance.as_str())
        .bind(device_id)
        .execute(&mut *tx)
        .await?;

    let order = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    tx.commit().await?;

    tracing::info!(order_id = id, order_number = %order.order_number, "Maintenance order opened");

    recorder
        .record(
            AuditEvent::new(AuditAction::Create, ResourceType::Maintenance, id)
                .by(principal)
                .details(&json!({
                    "orderNumber": &order.order_number,
                    "deviceId": device_id,
                    "deviceImei": &order.device_imei,
                })),
        )
        .await;

    Ok(order)
}
