use sqlx::PgPool;

use super::MaintenanceQueryError;
use crate::features::maintenance::models::{MaintenanceOrder, ORDER_SELECT};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<Vec<MaintenanceOrder>, MaintenanceQueryError> {
    let orders = sqlx::query_as::<_, MaintenanceOrder>(&format!(
        "{ORDER_SELECT} ORDER BY m.sent_date DESC, m.id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(orders)
}
