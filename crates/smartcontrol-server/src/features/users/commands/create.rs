//! Create a user

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use super::permission_set;
use crate::access::{PermissionSet, Principal};
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::{
    constraint_violation, required_text, ConstraintViolation, ValidationError, MAX_TEXT_LENGTH,
};
use crate::features::users::models::{UserProfile, UserRow, USER_COLUMNS};
use crate::features::users::password::{self, PasswordError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserCommand {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq)]
struct NewUser {
    name: String,
    username: String,
    password: String,
    role: String,
    permissions: PermissionSet,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Stored user is corrupt: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateUserError> for AppError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::Validation(e) => e.into(),
            CreateUserError::DuplicateUsername(_) => AppError::Conflict(err.to_string()),
            CreateUserError::Password(_) | CreateUserError::Corrupt(_) => {
                AppError::Internal(err.to_string())
            },
            CreateUserError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateUserCommand {
    fn validate(&self) -> Result<NewUser, ValidationError> {
        let password = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ValidationError::Required("password"))?;
        Ok(NewUser {
            name: required_text("name", self.name.as_deref(), MAX_TEXT_LENGTH)?,
            username: required_text("username", self.username.as_deref(), MAX_TEXT_LENGTH)?,
            password: password.to_string(),
            role: required_text("role", self.role.as_deref(), MAX_TEXT_LENGTH)?,
            permissions: permission_set(self.permissions.as_ref())?,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: CreateUserCommand,
) -> Result<UserProfile, CreateUserError> {
    let user = command.validate()?;
    let password_hash = password::hash(user.password.clone()).await?;

    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (name, username, password_hash, role, permissions) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.name)
    .bind(&user.username)
    .bind(&password_hash)
    .bind(&user.role)
    .bind(user.permissions.to_json())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match constraint_violation(&e) {
        Some(ConstraintViolation::Unique) => {
            CreateUserError::DuplicateUsername(user.username.clone())
        },
        _ => CreateUserError::Database(e),
    })?;
    tx.commit().await?;

    let profile =
        UserProfile::try_from(row).map_err(|e| CreateUserError::Corrupt(e.to_string()))?;

    tracing::info!(user_id = profile.id, username = %profile.username, role = %profile.role, "User created");

    recorder
        .record(
            AuditEvent::new(AuditAction::Create, ResourceType::User, &profile.username)
                .by(principal)
                .details(&json!({
                    "message": format!("User {} ({}) created", profile.username, profile.role),
                    "permissions": &profile.permissions,
                })),
        )
        .await;

    Ok(profile)
}
