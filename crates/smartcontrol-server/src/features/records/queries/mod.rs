pub mod get;
pub mod list;

pub use list::{ListRecordsParams, StatusFilter};

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum RecordQueryError {
    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Unknown status filter '{0}'")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RecordQueryError> for AppError {
    fn from(err: RecordQueryError) -> Self {
        match err {
            RecordQueryError::NotFound(_) => AppError::NotFound(err.to_string()),
            RecordQueryError::InvalidStatus(_) => AppError::Validation(err.to_string()),
            RecordQueryError::Database(e) => AppError::Database(e),
        }
    }
}
