//! Update employee command

use serde_json::json;
use sqlx::PgPool;

use super::create::EmployeeCommand;
use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::employees::models::{Employee, EMPLOYEE_COLUMNS};
use crate::features::shared::{constraint_violation, ConstraintViolation, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum UpdateEmployeeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Employee {0} not found")]
    NotFound(i64),

    #[error("Registration {0} is already in use")]
    DuplicateRegistration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateEmployeeError> for AppError {
    fn from(err: UpdateEmployeeError) -> Self {
        match err {
            UpdateEmployeeError::Validation(e) => e.into(),
            UpdateEmployeeError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateEmployeeError::DuplicateRegistration(_) => AppError::Conflict(err.to_string()),
            UpdateEmployeeError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
    command: EmployeeCommand,
) -> Result<Employee, UpdateEmployeeError> {
    let input = command.validate()?;

    let mut tx = pool.begin().await?;
    let employee = sqlx::query_as::<_, Employee>(&format!(
        r#"
        UPDATE employees
        SET registration = $1, name = $2, position = $3, email = $4
        WHERE id = $5
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    ))
    .bind(&input.registration)
    .bind(&input.name)
    .bind(&input.position)
    .bind(&input.email)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => {
            UpdateEmployeeError::DuplicateRegistration(input.registration.clone())
        },
        _ => UpdateEmployeeError::Database(e),
    })?
    .ok_or(UpdateEmployeeError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(employee_id = id, "Employee updated");

    recorder
        .record(
            AuditEvent::new(AuditAction::Update, ResourceType::Employee, &employee.registration)
                .by(principal)
                .details(&json!({
                    "message": format!("Employee {} updated", employee.name),
                    "data": &employee,
                })),
        )
        .await;

    Ok(employee)
}
