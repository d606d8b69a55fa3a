pub mod get;
pub mod list;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum MaintenanceQueryError {
    #[error("Maintenance order {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MaintenanceQueryError> for AppError {
    fn from(err: MaintenanceQueryError) -> Self {
        match err {
            MaintenanceQueryError::NotFound(_) => AppError::NotFound(err.to_string()),
            MaintenanceQueryError::Database(e) => AppError::Database(e),
        }
    }
}
