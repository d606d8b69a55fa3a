//! Devices an employee has held

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use super::EmployeeQueryError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAssignment {
    pub record_id: i64,
    pub device_model: String,
    pub device_imei: String,
    pub delivery_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, id: i64) -> Result<Vec<EmployeeAssignment>, EmployeeQueryError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM employees WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(EmployeeQueryError::NotFound(id));
    }

    let history = sqlx::query_as::<_, EmployeeAssignment>(
        r#"
        SELECT r.id AS record_id, d.model AS device_model, d.imei1 AS device_imei,
               r.delivery_date, r.return_date, r.status
        FROM assignment_records r
        JOIN devices d ON d.id = r.device_id
        WHERE r.employee_id = $1
        ORDER BY r.delivery_date DESC, r.id DESC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(history)
}
