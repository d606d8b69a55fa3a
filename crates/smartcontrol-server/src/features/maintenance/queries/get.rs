use sqlx::PgPool;

use super::MaintenanceQueryError;
use crate::features::maintenance::models::{self, MaintenanceOrder};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, id: i64) -> Result<MaintenanceOrder, MaintenanceQueryError> {
    models::find_by_id(pool, id)
        .await?
        .ok_or(MaintenanceQueryError::NotFound(id))
}
