use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::access::principal::MalformedPermissions;
use crate::access::PermissionSet;

pub(crate) const USER_COLUMNS: &str = "id, name, username, role, permissions, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: String,
    pub permissions: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

/// A user as returned by the API, without the password hash
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: String,
    pub permissions: PermissionSet,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = MalformedPermissions;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            permissions: PermissionSet::from_stored(row.permissions.as_ref())?,
            id: row.id,
            name: row.name,
            username: row.username,
            role: row.role,
            created_at: row.created_at,
        })
    }
}
