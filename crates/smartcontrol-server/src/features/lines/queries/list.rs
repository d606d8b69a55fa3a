use sqlx::PgPool;

use super::LineQueryError;
use crate::features::lines::models::{Line, LINE_SELECT};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<Vec<Line>, LineQueryError> {
    let lines = sqlx::query_as::<_, Line>(&format!("{LINE_SELECT} ORDER BY l.number"))
        .fetch_all(pool)
        .await?;
    Ok(lines)
}
