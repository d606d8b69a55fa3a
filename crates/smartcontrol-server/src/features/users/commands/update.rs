//! Update a user
//!
//! Name and role are replaced. Permissions are replaced when sent, and the
//! password only changes when a new one is supplied.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use super::permission_set;
use crate::access::{PermissionSet, Principal};
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::{required_text, ValidationError, MAX_TEXT_LENGTH};
use crate::features::users::models::{UserProfile, UserRow, USER_COLUMNS};
use crate::features::users::password::{self, PasswordError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserCommand {
    pub name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub permissions: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq)]
struct UserChanges {
    name: String,
    role: String,
    password: Option<String>,
    permissions: Option<PermissionSet>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateUserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("User {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Stored user is corrupt: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateUserError> for AppError {
    fn from(err: UpdateUserError) -> Self {
        match err {
            UpdateUserError::Validation(e) => e.into(),
            UpdateUserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateUserError::Password(_) | UpdateUserError::Corrupt(_) => {
                AppError::Internal(err.to_string())
            },
            UpdateUserError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateUserCommand {
    fn validate(&self) -> Result<UserChanges, ValidationError> {
        Ok(UserChanges {
            name: required_text("name", self.name.as_deref(), MAX_TEXT_LENGTH)?,
            role: required_text("role", self.role.as_deref(), MAX_TEXT_LENGTH)?,
            password: self.password.clone().filter(|p| !p.is_empty()),
            permissions: self
                .permissions
                .as_ref()
                .map(|p| permission_set(Some(p)))
                .transpose()?,
        })
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
    command: UpdateUserCommand,
) -> Result<UserProfile, UpdateUserError> {
    let changes = command.validate()?;
    let password_hash = match changes.password.clone() {
        Some(plain) => Some(password::hash(plain).await?),
        None => None,
    };

    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET \
             name = $1, \
             role = $2, \
             permissions = COALESCE($3, permissions), \
             password_hash = COALESCE($4, password_hash), \
             updated_at = NOW() \
         WHERE id = $5 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&changes.name)
    .bind(&changes.role)
    .bind(changes.permissions.as_ref().map(PermissionSet::to_json))
    .bind(&password_hash)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(UpdateUserError::NotFound(id))?;
    tx.commit().await?;

    let profile = UserProfile::try_from(row).map_err(|e| UpdateUserError::Corrupt(e.to_string()))?;

    tracing::info!(user_id = id, password_changed = password_hash.is_some(), "User updated");

    recorder
        .record(
            AuditEvent::new(AuditAction::Update, ResourceType::User, id)
                .by(principal)
                .details(&json!({
                    "message": format!("User {} updated", profile.name),
                    "role": &profile.role,
                    "permissions": &profile.permissions,
                    "passwordChanged": password_hash.is_some(),
                })),
        )
        .await;

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_password_keeps_current() {
        let cmd = UpdateUserCommand {
            name: Some("Ana".into()),
            role: Some("technician".into()),
            password: Some(String::new()),
            permissions: None,
        };
        let changes = cmd.validate().unwrap();
        assert_eq!(changes.password, None);
        assert_eq!(changes.permissions, None);
    }

    #[test]
    fn test_name_and_role_required() {
        let cmd = UpdateUserCommand {
            role: Some("technician".into()),
            ..Default::default()
        };
        assert_eq!(cmd.validate(), Err(ValidationError::Required("name")));
    }
}
