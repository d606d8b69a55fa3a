//! Usage and maintenance history of one device

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use super::DeviceQueryError;
use crate::features::devices::models;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UsageHistoryItem {
    pub record_id: i64,
    pub employee_name: String,
    pub employee_registration: String,
    pub delivery_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceHistoryItem {
    pub order_id: i64,
    pub order_number: String,
    pub sent_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub reported_defect: String,
    pub cost: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceHistory {
    pub usage: Vec<UsageHistoryItem>,
    pub maintenance: Vec<MaintenanceHistoryItem>,
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, imei: &str) -> Result<DeviceHistory, DeviceQueryError> {
    let device = models::find_by_imei(pool, imei)
        .await?
        .ok_or_else(|| DeviceQueryError::NotFound(imei.to_string()))?;

    let usage = sqlx::query_as::<_, UsageHistoryItem>(
        r#"
        SELECT r.id AS record_id, e.name AS employee_name, e.registration AS employee_registration,
               r.delivery_date, r.return_date, r.status
        FROM assignment_records r
        JOIN employees e ON e.id = r.employee_id
        WHERE r.device_id = $1
        ORDER BY r.delivery_date DESC, r.id DESC
        "#,
    )
    .bind(device.id)
    .fetch_all(pool)
    .await?;

    let maintenance = sqlx::query_as::<_, MaintenanceHistoryItem>(
        r#"
        SELECT id AS order_id, order_number, sent_date, return_date, reported_defect,
               cost::FLOAT8 AS cost, status
        FROM maintenance_orders
        WHERE device_id = $1
        ORDER BY sent_date DESC, id DESC
        "#,
    )
    .bind(device.id)
    .fetch_all(pool)
    .await?;

    Ok(DeviceHistory { usage, maintenance })
}
