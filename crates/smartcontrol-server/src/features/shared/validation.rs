//! Input validation for free-text fields

use smartcontrol_common::CommonError;
use std::str::FromStr;
use thiserror::Error;

/// Longest accepted value for ordinary text columns
pub const MAX_TEXT_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<ValidationError> for crate::error::AppError {
    fn from(err: ValidationError) -> Self {
        crate::error::AppError::Validation(err.to_string())
    }
}

/// Trim `value` and reject it when missing, blank or longer than `max`
pub fn required_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Trim `value`, mapping blank strings to `None`
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Parse a required vocabulary value such as a device condition
pub fn required_choice<T>(field: &'static str, value: Option<&str>) -> Result<T, ValidationError>
where
    T: FromStr<Err = CommonError>,
{
    let raw = value.map(str::trim).filter(|v| !v.is_empty());
    let raw = raw.ok_or(ValidationError::Required(field))?;
    raw.parse().map_err(|err: CommonError| ValidationError::Invalid {
        field,
        reason: err.to_string(),
    })
}

/// Like [`required_choice`], but blank input is `None`
pub fn optional_choice<T>(field: &'static str, value: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = CommonError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => required_choice(field, Some(raw)).map(Some),
    }
}

/// Loose e-mail shape check: one `@` with text on both sides and a dot after it
pub fn validate_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::Invalid {
        field,
        reason: format!("'{value}' is not a valid e-mail address"),
    };
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("model", Some("  Moto G  "), 50).unwrap(), "Moto G");
        assert_eq!(required_text("model", Some("   "), 50), Err(ValidationError::Required("model")));
        assert_eq!(required_text("model", None, 50), Err(ValidationError::Required("model")));
        assert!(matches!(
            required_text("model", Some("abcdef"), 5),
            Err(ValidationError::TooLong { max: 5, .. })
        ));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("notes", Some(""), 10).unwrap(), None);
        assert_eq!(optional_text("notes", None, 10).unwrap(), None);
        assert_eq!(optional_text("notes", Some(" blue "), 10).unwrap(), Some("blue".into()));
        assert!(optional_text("notes", Some("much too long"), 4).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "ana@example.com").is_ok());
        assert!(validate_email("email", "ana@example").is_err());
        assert!(validate_email("email", "@example.com").is_err());
        assert!(validate_email("email", "ana@@example.com").is_err());
        assert!(validate_email("email", "ana").is_err());
    }

    #[test]
    fn test_required_choice() {
        use smartcontrol_common::types::DeviceCondition;

        let parsed: DeviceCondition = required_choice("condition", Some(" damaged ")).unwrap();
        assert_eq!(parsed, DeviceCondition::Damaged);
        assert_eq!(
            required_choice::<DeviceCondition>("condition", None),
            Err(ValidationError::Required("condition"))
        );
        let err = required_choice::<DeviceCondition>("condition", Some("Broken")).unwrap_err();
        assert_eq!(err.to_string(), "condition: Invalid condition: 'Broken'");
        assert_eq!(optional_choice::<DeviceCondition>("condition", Some("")).unwrap(), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::Required("IMEI 1").to_string(), "IMEI 1 is required");
    }
}
