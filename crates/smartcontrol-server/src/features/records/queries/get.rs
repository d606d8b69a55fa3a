use sqlx::PgPool;

use super::RecordQueryError;
use crate::features::records::models::{self, AssignmentRecord};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, id: i64) -> Result<AssignmentRecord, RecordQueryError> {
    models::find_by_id(pool, id)
        .await?
        .ok_or(RecordQueryError::NotFound(id))
}
