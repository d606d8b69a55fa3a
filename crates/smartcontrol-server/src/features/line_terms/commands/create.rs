//! Issue a line term to an employee

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use smartcontrol_common::types::TermStatus;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::line_terms::models::{self, LineTerm};
use crate::features::shared::{optional_text, required_text, ValidationError, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLineTermCommand {
    pub line_id: Option<i64>,
    pub employee_registration: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub term_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct NewTerm {
    line_id: i64,
    registration: String,
    delivery_date: NaiveDate,
    term_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateLineTermError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Line {0} not found")]
    LineNotFound(i64),

    #[error("Employee with registration '{0}' not found")]
    EmployeeNotFound(String),

    #[error("Term {0} vanished after insert")]
    Missing(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateLineTermError> for AppError {
    fn from(err: CreateLineTermError) -> Self {
        match err {
            CreateLineTermError::Validation(e) => e.into(),
            CreateLineTermError::LineNotFound(_) | CreateLineTermError::EmployeeNotFound(_) => {
                AppError::NotFound(err.to_string())
            },
            CreateLineTermError::Missing(_) => AppError::Internal(err.to_string()),
            CreateLineTermError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateLineTermCommand {
    fn validate(&self) -> Result<NewTerm, ValidationError> {
        Ok(NewTerm {
            line_id: self.line_id.ok_or(ValidationError::Required("lineId"))?,
            registration: required_text(
                "employeeRegistration",
                self.employee_registration.as_deref(),
                MAX_TEXT_LENGTH,
            )?,
            delivery_date: self.delivery_date.ok_or(ValidationError::Required("deliveryDate"))?,
            term_url: optional_text("termUrl", self.term_url.as_deref(), 1024)?,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: CreateLineTermCommand,
) -> Result<LineTerm, CreateLineTermError> {
    let term = command.validate()?;

    let mut tx = pool.begin().await?;

    let line_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM lines WHERE id = $1 FOR UPDATE")
        .bind(term.line_id)
        .fetch_optional(&mut *tx)
        .await?;
    if line_exists.is_none() {
        return Err(CreateLineTermError::LineNotFound(term.line_id));
    }

    let employee_id: i64 = sqlx::query_scalar("SELECT id FROM employees WHERE registration = $1")
        .bind(&term.registration)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CreateLineTermError::EmployeeNotFound(term.registration.clone()))?;

    let retired = sqlx::query("UPDATE line_terms SET status = $1 WHERE line_id = $2 AND status = $3")
        .bind(TermStatus::Inactive.as_str())
        .bind(term.line_id)
        .bind(TermStatus::Active.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO line_terms (line_id, employee_id, delivery_date, delivered_by, term_url, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(term.line_id)
    .bind(employee_id)
    .bind(term.delivery_date)
    .bind(&principal.display_name)
    .bind(&term.term_url)
    .bind(TermStatus::Active.as_str())
    .fetch_one(&mut *tx)
    .await?;

    let created = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(CreateLineTermError::Missing(id))?;
    tx.commit().await?;

    tracing::info!(term_id = id, line_id = term.line_id, retired, "Line term issued");

    recorder
        .record(
            AuditEvent::new(AuditAction::Create, ResourceType::LineTerm, id)
                .by(principal)
                .details(&json!({
                    "lineId": term.line_id,
                    "lineNumber": &created.line_number,
                    "employeeRegistration": &term.registration,
                    "retiredTerms": retired,
                })),
        )
        .await;

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CreateLineTermCommand {
        CreateLineTermCommand {
            line_id: Some(4),
            employee_registration: Some(" 1001 ".into()),
            delivery_date: NaiveDate::from_ymd_opt(2026, 3, 2),
            term_url: None,
        }
    }

    #[test]
    fn test_valid_term() {
        let term = command().validate().unwrap();
        assert_eq!(term.line_id, 4);
        assert_eq!(term.registration, "1001");
    }

    #[test]
    fn test_missing_fields() {
        let cmd = CreateLineTermCommand { line_id: None, ..command() };
        assert_eq!(cmd.validate(), Err(ValidationError::Required("lineId")));

        let cmd = CreateLineTermCommand { delivery_date: None, ..command() };
        assert_eq!(cmd.validate(), Err(ValidationError::Required("deliveryDate")));
    }
}
