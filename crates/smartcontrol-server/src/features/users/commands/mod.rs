pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateUserCommand, CreateUserError};
pub use delete::DeleteUserError;
pub use update::{UpdateUserCommand, UpdateUserError};

use serde_json::Value as JsonValue;

use crate::access::{capability, PermissionSet};
use crate::features::shared::ValidationError;

/// Decode a submitted permission map, rejecting keys outside the catalogue
pub(crate) fn permission_set(value: Option<&JsonValue>) -> Result<PermissionSet, ValidationError> {
    let set = PermissionSet::from_stored(value).map_err(|e| ValidationError::Invalid {
        field: "permissions",
        reason: e.to_string(),
    })?;
    if let Some(unknown) = set.keys().find(|key| capability::find(key).is_none()) {
        return Err(ValidationError::Invalid {
            field: "permissions",
            reason: format!("unknown capability '{unknown}'"),
        });
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::capability::{DEVICES_CREATE, DEVICES_DELETE};
    use serde_json::json;

    #[test]
    fn test_permission_set_accepts_catalogue_keys() {
        let set = permission_set(Some(&json!({"devices_create": true, "devices_delete": false})))
            .unwrap();
        assert!(set.allows(DEVICES_CREATE));
        assert!(!set.allows(DEVICES_DELETE));
        assert!(permission_set(None).unwrap().is_empty());
    }

    #[test]
    fn test_permission_set_rejects_unknown_keys() {
        let err = permission_set(Some(&json!({"devices_launch": true}))).unwrap_err();
        assert!(err.to_string().contains("devices_launch"));
        assert!(permission_set(Some(&json!("yes"))).is_err());
    }
}
