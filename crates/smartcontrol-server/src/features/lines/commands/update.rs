//! Update line command

use serde_json::json;
use sqlx::PgPool;

use super::create::LineCommand;
use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::lines::models::{self, Line};
use crate::features::shared::{constraint_violation, ConstraintViolation, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum UpdateLineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Line {0} not found")]
    NotFound(i64),

    #[error("Line number {0} is already registered")]
    DuplicateNumber(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateLineError> for AppError {
    fn from(err: UpdateLineError) -> Self {
        match err {
            UpdateLineError::Validation(e) => e.into(),
            UpdateLineError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateLineError::DuplicateNumber(_) => AppError::Conflict(err.to_string()),
            UpdateLineError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
    command: LineCommand,
) -> Result<Line, UpdateLineError> {
    let input = command.validate()?;

    let mut tx = pool.begin().await?;
    let updated = sqlx::query(
        "UPDATE lines SET number = $1, carrier = $2, plan = $3, status = $4 WHERE id = $5",
    )
    .bind(&input.number)
    .bind(&input.carrier)
    .bind(&input.plan)
    .bind(&input.status)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => UpdateLineError::DuplicateNumber(input.number.clone()),
        _ => UpdateLineError::Database(e),
    })?;
    if updated.rows_affected() == 0 {
        return Err(UpdateLineError::NotFound(id));
    }
    let line = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(UpdateLineError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(line_id = id, "Line updated");

    recorder
        .record(
            AuditEvent::new(AuditAction::Update, ResourceType::Line, id)
                .by(principal)
                .details(&json!({
                    "message": format!("Line {} updated", line.number),
                    "data": &line,
                })),
        )
        .await;

    Ok(line)
}
