pub mod history;
pub mod list;

pub use history::EmployeeAssignment;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum EmployeeQueryError {
    #[error("Employee {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<EmployeeQueryError> for AppError {
    fn from(err: EmployeeQueryError) -> Self {
        match err {
            EmployeeQueryError::NotFound(_) => AppError::NotFound(err.to_string()),
            EmployeeQueryError::Database(e) => AppError::Database(e),
        }
    }
}
