pub mod eligible;
pub mod get;
pub mod history;
pub mod list;

pub use history::{DeviceHistory, MaintenanceHistoryItem, UsageHistoryItem};

use crate::error::AppError;

/// Errors shared by the device read paths
#[derive(Debug, thiserror::Error)]
pub enum DeviceQueryError {
    #[error("Device with IMEI '{0}' not found")]
    NotFound(String),

    #[error("Stored device data is invalid: {0}")]
    Corrupt(#[from] smartcontrol_common::CommonError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeviceQueryError> for AppError {
    fn from(err: DeviceQueryError) -> Self {
        match err {
            DeviceQueryError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeviceQueryError::Corrupt(e) => AppError::Internal(e.to_string()),
            DeviceQueryError::Database(e) => AppError::Database(e),
        }
    }
}
