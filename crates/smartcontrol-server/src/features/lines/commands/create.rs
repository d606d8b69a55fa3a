//! Create line command

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::lines::models::{self, Line};
use crate::features::shared::{
    constraint_violation, optional_text, required_text, ConstraintViolation, ValidationError,
    MAX_TEXT_LENGTH,
};

pub const MAX_NUMBER_LENGTH: usize = 32;

/// Body of both the create and the update routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCommand {
    pub number: Option<String>,
    pub carrier: Option<String>,
    pub plan: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLine {
    pub number: String,
    pub carrier: String,
    pub plan: Option<String>,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateLineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Line number {0} is already registered")]
    DuplicateNumber(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateLineError> for AppError {
    fn from(err: CreateLineError) -> Self {
        match err {
            CreateLineError::Validation(e) => e.into(),
            CreateLineError::DuplicateNumber(_) => AppError::Conflict(err.to_string()),
            CreateLineError::Database(e) => AppError::Database(e),
        }
    }
}

impl LineCommand {
    pub fn validate(&self) -> Result<NewLine, ValidationError> {
        Ok(NewLine {
            number: required_text("number", self.number.as_deref(), MAX_NUMBER_LENGTH)?,
            carrier: required_text("carrier", self.carrier.as_deref(), MAX_TEXT_LENGTH)?,
            plan: optional_text("plan", self.plan.as_deref(), MAX_TEXT_LENGTH)?,
            status: required_text("status", self.status.as_deref(), 64)?,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command), fields(number = ?command.number))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: LineCommand,
) -> Result<Line, CreateLineError> {
    let input = command.validate()?;

    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO lines (number, carrier, plan, status) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&input.number)
    .bind(&input.carrier)
    .bind(&input.plan)
    .bind(&input.status)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => CreateLineError::DuplicateNumber(input.number.clone()),
        _ => CreateLineError::Database(e),
    })?;
    let line = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    tx.commit().await?;

    tracing::info!(line_id = id, "Line created");

    recorder
        .record(
            AuditEvent::new(AuditAction::Create, ResourceType::Line, &line.number)
                .by(principal)
                .details(&json!({
                    "message": format!("Line created: {}", line.number),
                    "data": &line,
                })),
        )
        .await;

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_is_optional() {
        let cmd = LineCommand {
            number: Some("+55 11 99999-0000".into()),
            carrier: Some("Vivo".into()),
            plan: Some(" ".into()),
            status: Some("Active".into()),
        };
        let line = cmd.validate().unwrap();
        assert_eq!(line.plan, None);
    }

    #[test]
    fn test_status_is_required() {
        let cmd = LineCommand {
            number: Some("1".into()),
            carrier: Some("Vivo".into()),
            ..Default::default()
        };
        assert_eq!(cmd.validate(), Err(ValidationError::Required("status")));
    }
}
