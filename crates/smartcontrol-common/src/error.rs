//! Error types shared across the workspace

use thiserror::Error;

/// Errors raised by common utilities
#[derive(Debug, Error)]
pub enum CommonError {
    /// A value did not belong to the expected vocabulary
    #[error("Invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// The tracing subscriber could not be configured
    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommonError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = CommonError::invalid("condition", "Broken");
        assert_eq!(err.to_string(), "Invalid condition: 'Broken'");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CommonError = io.into();
        assert!(matches!(err, CommonError::Io(_)));
    }
}
