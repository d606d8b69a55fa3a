use sqlx::PgPool;

use crate::features::line_terms::models::{LineTerm, TERM_SELECT};

/// Every term, newest delivery first
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<Vec<LineTerm>, sqlx::Error> {
    sqlx::query_as::<_, LineTerm>(&format!(
        "{TERM_SELECT} ORDER BY t.delivery_date DESC, t.id DESC"
    ))
    .fetch_all(pool)
    .await
}
