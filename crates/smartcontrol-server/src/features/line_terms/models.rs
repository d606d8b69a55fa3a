use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgExecutor;

pub(crate) const TERM_SELECT: &str = r#"
    SELECT t.id, t.line_id, l.number AS line_number, t.employee_id, e.name AS employee_name,
           e.registration AS employee_registration, t.delivery_date, t.delivered_by,
           t.term_url, t.status, t.created_at
    FROM line_terms t
    JOIN lines l ON l.id = t.line_id
    JOIN employees e ON e.id = t.employee_id
"#;

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LineTerm {
    pub id: i64,
    pub line_id: i64,
    pub line_number: String,
    pub employee_id: i64,
    pub employee_name: String,
    pub employee_registration: String,
    pub delivery_date: NaiveDate,
    pub delivered_by: Option<String>,
    pub term_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<LineTerm>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, LineTerm>(&format!("{TERM_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}
