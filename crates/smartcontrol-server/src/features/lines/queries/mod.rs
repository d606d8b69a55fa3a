pub mod history;
pub mod list;

pub use history::LineTermHistoryItem;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum LineQueryError {
    #[error("Line {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LineQueryError> for AppError {
    fn from(err: LineQueryError) -> Self {
        match err {
            LineQueryError::NotFound(_) => AppError::NotFound(err.to_string()),
            LineQueryError::Database(e) => AppError::Database(e),
        }
    }
}
