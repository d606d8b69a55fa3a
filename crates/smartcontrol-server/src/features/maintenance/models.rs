use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgExecutor;

pub(crate) const ORDER_SELECT: &str = r#"
    SELECT m.id, m.order_number, m.device_id, d.model AS device_model, d.imei1 AS device_imei,
           m.sent_date, m.return_date, m.reported_defect, m.service_performed, m.supplier,
           m.cost::FLOAT8 AS cost, m.status, m.created_at
    FROM maintenance_orders m
    JOIN devices d ON d.id = m.device_id
"#;

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceOrder {
    pub id: i64,
    pub order_number: String,
    pub device_id: i64,
    pub device_model: String,
    pub device_imei: String,
    pub sent_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub reported_defect: String,
    pub service_performed: Option<String>,
    pub supplier: Option<String>,
    pub cost: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// `SO-{year}-{sequence}`, sequence zero-padded to five digits
pub fn order_number(year: i32, sequence: i64) -> String {
    format!("SO-{year}-{sequence:05}")
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<MaintenanceOrder>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, MaintenanceOrder>(&format!("{ORDER_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number() {
        assert_eq!(order_number(2026, 1), "SO-2026-00001");
        assert_eq!(order_number(2026, 421), "SO-2026-00421");
        assert_eq!(order_number(2027, 123456), "SO-2027-123456");
    }
}
