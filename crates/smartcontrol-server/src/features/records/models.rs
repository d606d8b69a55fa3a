use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgExecutor;

pub(crate) const RECORD_SELECT: &str = r#"
    SELECT r.id, r.status,
           r.delivery_date, r.delivery_condition, r.delivery_notes, r.accessories,
           r.delivery_term_url, r.delivery_checker,
           r.return_date, r.return_condition, r.return_notes, r.return_term_url,
           r.police_report_url, r.return_checker,
           e.id AS employee_id, e.name AS employee_name,
           e.registration AS employee_registration, e.position AS employee_position,
           d.id AS device_id, d.model AS device_model, d.imei1 AS device_imei,
           l.number AS device_line,
           r.created_at
    FROM assignment_records r
    JOIN employees e ON e.id = r.employee_id
    JOIN devices d ON d.id = r.device_id
    LEFT JOIN lines l ON l.id = d.line_id
"#;

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: i64,
    pub status: String,
    pub delivery_date: NaiveDate,
    pub delivery_condition: Option<String>,
    pub delivery_notes: Option<String>,
    pub accessories: JsonValue,
    pub delivery_term_url: Option<String>,
    pub delivery_checker: Option<String>,
    pub return_date: Option<NaiveDate>,
    pub return_condition: Option<String>,
    pub return_notes: Option<String>,
    pub return_term_url: Option<String>,
    pub police_report_url: Option<String>,
    pub return_checker: Option<String>,
    pub employee_id: i64,
    pub employee_name: String,
    pub employee_registration: String,
    pub employee_position: String,
    pub device_id: i64,
    pub device_model: String,
    pub device_imei: String,
    pub device_line: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<AssignmentRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AssignmentRecord>(&format!("{RECORD_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}
