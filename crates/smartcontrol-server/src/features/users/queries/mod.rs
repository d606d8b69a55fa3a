pub mod list;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum UserQueryError {
    #[error("Stored user is corrupt: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UserQueryError> for AppError {
    fn from(err: UserQueryError) -> Self {
        match err {
            UserQueryError::Corrupt(_) => AppError::Internal(err.to_string()),
            UserQueryError::Database(e) => AppError::Database(e),
        }
    }
}
