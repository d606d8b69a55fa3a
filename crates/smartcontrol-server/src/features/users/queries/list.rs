use sqlx::PgPool;

use super::UserQueryError;
use crate::features::users::models::{UserProfile, UserRow, USER_COLUMNS};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<Vec<UserProfile>, UserQueryError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|row| {
            let id = row.id;
            UserProfile::try_from(row)
                .map_err(|e| UserQueryError::Corrupt(format!("user {id}: {e}")))
        })
        .collect()
}
