//! Create employee command

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::employees::models::{Employee, EMPLOYEE_COLUMNS};
use crate::features::shared::{
    constraint_violation, optional_text, required_text, validate_email, ConstraintViolation,
    ValidationError, MAX_TEXT_LENGTH,
};

/// Body of both the create and the update routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCommand {
    pub registration: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub registration: String,
    pub name: String,
    pub position: String,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateEmployeeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Registration {0} is already in use")]
    DuplicateRegistration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateEmployeeError> for AppError {
    fn from(err: CreateEmployeeError) -> Self {
        match err {
            CreateEmployeeError::Validation(e) => e.into(),
            CreateEmployeeError::DuplicateRegistration(_) => AppError::Conflict(err.to_string()),
            CreateEmployeeError::Database(e) => AppError::Database(e),
        }
    }
}

impl EmployeeCommand {
    pub fn validate(&self) -> Result<NewEmployee, ValidationError> {
        let email = optional_text("email", self.email.as_deref(), MAX_TEXT_LENGTH)?;
        if let Some(email) = &email {
            validate_email("email", email)?;
        }
        Ok(NewEmployee {
            registration: required_text("registration", self.registration.as_deref(), 64)?,
            name: required_text("name", self.name.as_deref(), MAX_TEXT_LENGTH)?,
            position: required_text("position", self.position.as_deref(), MAX_TEXT_LENGTH)?,
            email,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command), fields(registration = ?command.registration))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: EmployeeCommand,
) -> Result<Employee, CreateEmployeeError> {
    let input = command.validate()?;

    let mut tx = pool.begin().await?;
    let employee = sqlx::query_as::<_, Employee>(&format!(
        r#"
        INSERT INTO employees (registration, name, position, email)
        VALUES ($1, $2, $3, $4)
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    ))
    .bind(&input.registration)
    .bind(&input.name)
    .bind(&input.position)
    .bind(&input.email)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => {
            CreateEmployeeError::DuplicateRegistration(input.registration.clone())
        },
        _ => CreateEmployeeError::Database(e),
    })?;
    tx.commit().await?;

    tracing::info!(employee_id = employee.id, "Employee created");

    recorder
        .record(
            AuditEvent::new(AuditAction::Create, ResourceType::Employee, &employee.registration)
                .by(principal)
                .details(&json!({
                    "message": format!("Employee created: {}", employee.name),
                    "data": &employee,
                })),
        )
        .await;

    Ok(employee)
}
