use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use thiserror::Error;

use crate::error::AppError;
use crate::features::users::models::{UserProfile, UserRow};
use crate::features::users::password::{self, PasswordError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginCommand {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Stored user is corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::MissingCredentials => AppError::BadRequest(err.to_string()),
            LoginError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            LoginError::Corrupt(_) | LoginError::Password(_) => AppError::Internal(err.to_string()),
            LoginError::Database(e) => AppError::Database(e),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct Credentials {
    id: i64,
    name: String,
    username: String,
    role: String,
    permissions: Option<JsonValue>,
    password_hash: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl LoginCommand {
    fn credentials(&self) -> Result<(&str, &str), LoginError> {
        match (self.username.as_deref().map(str::trim), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Ok((user, pass)),
            _ => Err(LoginError::MissingCredentials),
        }
    }
}

#[tracing::instrument(skip_all, fields(username = ?command.username))]
pub async fn handle(pool: &PgPool, command: LoginCommand) -> Result<UserProfile, LoginError> {
    let (username, plain) = command.credentials()?;

    let Some(stored) = sqlx::query_as::<_, Credentials>(
        "SELECT id, name, username, role, permissions, password_hash, created_at \
         FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    else {
        tracing::warn!("Login failed: unknown user");
        return Err(LoginError::InvalidCredentials);
    };

    if !password::verify(plain.to_string(), stored.password_hash).await? {
        tracing::warn!(user_id = stored.id, "Login failed: wrong password");
        return Err(LoginError::InvalidCredentials);
    }

    let profile = UserProfile::try_from(UserRow {
        id: stored.id,
        name: stored.name,
        username: stored.username,
        role: stored.role,
        permissions: stored.permissions,
        created_at: stored.created_at,
    })
    .map_err(|e| LoginError::Corrupt(e.to_string()))?;

    tracing::info!(user_id = profile.id, "Login succeeded");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        let missing = LoginCommand {
            username: Some("admin".into()),
            password: None,
        };
        assert!(matches!(missing.credentials(), Err(LoginError::MissingCredentials)));

        let blank = LoginCommand {
            username: Some("  ".into()),
            password: Some("pw".into()),
        };
        assert!(matches!(blank.credentials(), Err(LoginError::MissingCredentials)));

        let ok = LoginCommand {
            username: Some(" admin ".into()),
            password: Some("pw".into()),
        };
        assert_eq!(ok.credentials().unwrap(), ("admin", "pw"));
    }

    #[test]
    fn test_error_statuses() {
        use axum::http::StatusCode;
        assert_eq!(AppError::from(LoginError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::from(LoginError::MissingCredentials).status(), StatusCode::BAD_REQUEST);
    }
}
