use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;

/// Line columns plus the IMEI of the first device linked to it
pub(crate) const LINE_SELECT: &str = r#"
    SELECT l.id, l.number, l.carrier, l.plan, l.status,
           (SELECT d.imei1 FROM devices d WHERE d.line_id = l.id ORDER BY d.id LIMIT 1) AS linked_imei,
           l.created_at
    FROM lines l
"#;

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: i64,
    pub number: String,
    pub carrier: String,
    pub plan: Option<String>,
    pub status: String,
    pub linked_imei: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Line>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Line>(&format!("{LINE_SELECT} WHERE l.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}
