//! Update a service order
//!
//! Only the fields present in the body change. `postCondition` moves the
//! device to the condition it came back in, in the same transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use smartcontrol_common::types::{DeviceCondition, MaintenanceStatus};
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::maintenance::models::{self, MaintenanceOrder};
use crate::features::shared::{optional_choice, optional_text, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenanceCommand {
    pub return_date: Option<NaiveDate>,
    pub service_performed: Option<String>,
    pub cost: Option<f64>,
    pub status: Option<String>,
    pub post_condition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderChanges {
    return_date: Option<NaiveDate>,
    service_performed: Option<String>,
    cost: Option<f64>,
    status: Option<MaintenanceStatus>,
    post_condition: Option<DeviceCondition>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateMaintenanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Maintenance order {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateMaintenanceError> for AppError {
    fn from(err: UpdateMaintenanceError) -> Self {
        match err {
            UpdateMaintenanceError::Validation(e) => e.into(),
            UpdateMaintenanceError::NoFieldsToUpdate => AppError::Validation(err.to_string()),
            UpdateMaintenanceError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateMaintenanceError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateMaintenanceCommand {
    fn validate(&self) -> Result<OrderChanges, UpdateMaintenanceError> {
        if let Some(cost) = self.cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ValidationError::Invalid {
                    field: "cost",
                    reason: "must be a non-negative amount".to_string(),
                }
                .into());
            }
        }
        let changes = OrderChanges {
            return_date: self.return_date,
            service_performed: optional_text(
                "servicePerformed",
                self.service_performed.as_deref(),
                2000,
            )?,
            cost: self.cost,
            status: optional_choice("status", self.status.as_deref())?,
            post_condition: optional_choice("postCondition", self.post_condition.as_deref())?,
        };
        if changes == OrderChanges::default() {
            return Err(UpdateMaintenanceError::NoFieldsToUpdate);
        }
        Ok(changes)
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
    command: UpdateMaintenanceCommand,
) -> Result<MaintenanceOrder, UpdateMaintenanceError> {
    let changes = command.validate()?;

    let mut tx = pool.begin().await?;
    let device_id: i64 = sqlx::query_scalar(
        r#"
        UPDATE maintenance_orders SET
            return_date = COALESCE($1, return_date),
            service_performed = COALESCE($2, service_performed),
            cost = COALESCE($3::FLOAT8::NUMERIC(12, 2), cost),
            status = COALESCE($4, status)
        WHERE id = $5
        RETURNING device_id
        "#,
    )
    .bind(changes.return_date)
    .bind(&changes.service_performed)
    .bind(changes.cost)
    .bind(changes.status.map(|s| s.as_str()))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(UpdateMaintenanceError::NotFound(id))?;

    if let Some(condition) = changes.post_condition {
        sqlx::query("UPDATE devices SET condition = $1 WHERE id = $2")
            .bind(condition.as_str())
            .bind(device_id)
            .execute(&mut *tx)
            .await?;
    }

    let order = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(UpdateMaintenanceError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(order_id = id, status = %order.status, "Maintenance order updated");

    recorder
        .record(
            AuditEvent::new(AuditAction::Update, ResourceType::Maintenance, id)
                .by(principal)
                .details(&json!({
                    "orderNumber": &order.order_number,
                    "changes": &changes,
                })),
        )
        .await;

    Ok(order)
}
