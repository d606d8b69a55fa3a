//! Principals and their permission sets

use super::capability::Capability;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Role that bypasses permission checks
pub const ADMINISTRATOR_ROLE: &str = "administrator";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Administrator,
    Named(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Administrator => ADMINISTRATOR_ROLE,
            Role::Named(name) => name,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        if value == ADMINISTRATOR_ROLE {
            Role::Administrator
        } else {
            Role::Named(value.to_string())
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value == ADMINISTRATOR_ROLE {
            Role::Administrator
        } else {
            Role::Named(value)
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Stored permission data that is not a capability map
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed permission set: expected an object, found {found}")]
pub struct MalformedPermissions {
    pub found: &'static str,
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Capability name to grant flag
///
/// Only an explicit `true` grants a capability; missing keys deny.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<String, bool>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the stored column value
    ///
    /// `NULL` and JSON `null` decode to the empty set. A JSON string holding
    /// an encoded object is accepted for rows written as text. Object entries
    /// whose value is not a boolean are kept as not granted.
    pub fn from_stored(value: Option<&JsonValue>) -> Result<Self, MalformedPermissions> {
        match value {
            None | Some(JsonValue::Null) => Ok(Self::new()),
            Some(JsonValue::Object(map)) => Ok(Self(
                map.iter()
                    .map(|(key, granted)| (key.clone(), granted.as_bool() == Some(true)))
                    .collect(),
            )),
            Some(JsonValue::String(text)) if text.trim().is_empty() => Ok(Self::new()),
            Some(JsonValue::String(text)) => match serde_json::from_str::<JsonValue>(text) {
                Ok(inner @ JsonValue::Object(_)) => Self::from_stored(Some(&inner)),
                Ok(other) => Err(MalformedPermissions {
                    found: kind_of(&other),
                }),
                Err(_) => Err(MalformedPermissions { found: "string" }),
            },
            Some(other) => Err(MalformedPermissions {
                found: kind_of(other),
            }),
        }
    }

    pub fn grant(mut self, capability: Capability) -> Self {
        self.0.insert(capability.key().to_string(), true);
        self
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.0.get(capability.key()).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), JsonValue::Bool(*v)))
                .collect(),
        )
    }
}

impl FromIterator<(String, bool)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Principal row as read from storage, before decoding
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PrincipalRecord {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub permissions: Option<JsonValue>,
}

/// The actor of the current request, resolved by the access guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub display_name: String,
    pub role: Role,
    pub permissions: PermissionSet,
}

impl Principal {
    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}

impl TryFrom<PrincipalRecord> for Principal {
    type Error = MalformedPermissions;

    fn try_from(record: PrincipalRecord) -> Result<Self, Self::Error> {
        let permissions = PermissionSet::from_stored(record.permissions.as_ref())?;
        Ok(Self {
            id: record.id,
            display_name: record.name,
            role: Role::from(record.role),
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::capability::{DEVICES_CREATE, DEVICES_DELETE};
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("administrator"), Role::Administrator);
        assert_eq!(Role::from("technician"), Role::Named("technician".into()));
        // role names are compared exactly
        assert_eq!(Role::from("Administrator"), Role::Named("Administrator".into()));
    }

    #[test]
    fn test_missing_permissions_decode_empty() {
        assert!(PermissionSet::from_stored(None).unwrap().is_empty());
        assert!(PermissionSet::from_stored(Some(&JsonValue::Null)).unwrap().is_empty());
        assert!(PermissionSet::from_stored(Some(&json!(""))).unwrap().is_empty());
    }

    #[test]
    fn test_only_true_grants() {
        let set = PermissionSet::from_stored(Some(&json!({
            "devices_create": true,
            "devices_delete": 1,
            "devices_update": "true",
            "devices_import": false
        })))
        .unwrap();

        assert!(set.allows(DEVICES_CREATE));
        assert!(!set.allows(DEVICES_DELETE));
        assert!(!set.allows(crate::access::capability::DEVICES_UPDATE));
        assert!(!set.allows(crate::access::capability::DEVICES_IMPORT));
    }

    #[test]
    fn test_text_encoded_object_is_accepted() {
        let stored = json!("{\"devices_create\": true}");
        let set = PermissionSet::from_stored(Some(&stored)).unwrap();
        assert!(set.allows(DEVICES_CREATE));
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert_eq!(
            PermissionSet::from_stored(Some(&json!(["devices_create"]))),
            Err(MalformedPermissions { found: "array" })
        );
        assert_eq!(
            PermissionSet::from_stored(Some(&json!("not json"))),
            Err(MalformedPermissions { found: "string" })
        );
        assert_eq!(
            PermissionSet::from_stored(Some(&json!("[1,2]"))),
            Err(MalformedPermissions { found: "array" })
        );
    }

    #[test]
    fn test_principal_from_record() {
        let principal = Principal::try_from(PrincipalRecord {
            id: 7,
            name: "Ana".into(),
            role: "technician".into(),
            permissions: Some(json!({"devices_create": true})),
        })
        .unwrap();

        assert_eq!(principal.display_name, "Ana");
        assert!(!principal.is_administrator());
        assert!(principal.permissions.allows(DEVICES_CREATE));
    }

    #[test]
    fn test_permission_set_json() {
        let set = PermissionSet::new().grant(DEVICES_CREATE);
        assert_eq!(set.to_json(), json!({"devices_create": true}));
        assert_eq!(serde_json::to_value(&set).unwrap(), set.to_json());
    }
}
