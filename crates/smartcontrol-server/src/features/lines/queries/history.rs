//! Terms under which a line was handed out, newest first

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use super::LineQueryError;
use crate::features::lines::models;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LineTermHistoryItem {
    pub term_id: i64,
    pub employee_name: String,
    pub employee_registration: String,
    pub delivery_date: NaiveDate,
    pub delivered_by: Option<String>,
    pub term_url: Option<String>,
    pub status: String,
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, id: i64) -> Result<Vec<LineTermHistoryItem>, LineQueryError> {
    if models::find_by_id(pool, id).await?.is_none() {
        return Err(LineQueryError::NotFound(id));
    }

    let history = sqlx::query_as::<_, LineTermHistoryItem>(
        r#"
        SELECT t.id AS term_id, e.name AS employee_name, e.registration AS employee_registration,
               t.delivery_date, t.delivered_by, t.term_url, t.status
        FROM line_terms t
        JOIN employees e ON e.id = t.employee_id
        WHERE t.line_id = $1
        ORDER BY t.delivery_date DESC, t.id DESC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(history)
}
