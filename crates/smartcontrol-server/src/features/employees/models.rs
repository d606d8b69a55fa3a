use chrono::{DateTime, Utc};
use serde::Serialize;

pub(crate) const EMPLOYEE_COLUMNS: &str = "id, registration, name, position, email, created_at";

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub registration: String,
    pub name: String,
    pub position: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
