//! The access decision
//!
//! [`decide`] runs three checks in order and stops at the first failure:
//!
//! 1. the request carried a parseable payload
//! 2. the payload names an actor
//! 3. the actor resolves in the principal store
//!
//! The resolved principal is then allowed if it holds the administrator role
//! or its permission set maps the capability to `true`. Nothing is cached, so
//! every call observes the store as it is at that moment.

use super::capability::Capability;
use super::layer::RequireCapability;
use super::principal::Principal;
use super::store::PrincipalStore;
use crate::api::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Body field carrying the acting user
pub const ACTOR_FIELD: &str = "currentUser";

/// Why a caller could not be identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationFailure {
    MissingCredentials,
    MissingActorId,
    UnknownActor,
}

impl fmt::Display for AuthenticationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthenticationFailure::MissingCredentials => "missing credentials",
            AuthenticationFailure::MissingActorId => "missing actor identifier",
            AuthenticationFailure::UnknownActor => "unknown actor",
        })
    }
}

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Authentication failed: {0}")]
    Authentication(AuthenticationFailure),

    #[error("Actor {actor_id} ({role}) lacks capability '{capability}'")]
    Authorization {
        actor_id: i64,
        role: String,
        capability: Capability,
    },

    #[error("Access check failed: {0}")]
    Infrastructure(String),
}

impl GuardError {
    pub fn status(&self) -> StatusCode {
        match self {
            GuardError::Authentication(_) => StatusCode::UNAUTHORIZED,
            GuardError::Authorization { .. } => StatusCode::FORBIDDEN,
            GuardError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            GuardError::Authentication(failure) => ErrorResponse::new(
                "UNAUTHORIZED",
                format!("Authentication required: {failure}"),
            ),
            GuardError::Authorization { .. } => ErrorResponse::new(
                "FORBIDDEN",
                "You do not have permission to perform this action",
            ),
            GuardError::Infrastructure(_) => {
                ErrorResponse::new("INTERNAL_ERROR", "Unable to verify permissions")
            },
        };
        body.into_response_with(status)
    }
}

/// Outcome of evaluating a resolved principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Apply the decision rule to an already resolved principal
pub fn evaluate(principal: &Principal, capability: Capability) -> Decision {
    if principal.is_administrator() || principal.permissions.allows(capability) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Pull the actor id out of the request payload
///
/// `Ok(None)` means an id is present but can never match a stored principal,
/// such as a non-numeric string.
fn actor_id(payload: &JsonValue) -> Result<Option<i64>, AuthenticationFailure> {
    let id = payload
        .get(ACTOR_FIELD)
        .and_then(|actor| actor.get("id"))
        .ok_or(AuthenticationFailure::MissingActorId)?;

    match id {
        JsonValue::Null | JsonValue::Bool(false) => Err(AuthenticationFailure::MissingActorId),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Err(AuthenticationFailure::MissingActorId),
            Some(id) => Ok(Some(id)),
            None => Ok(None),
        },
        JsonValue::String(s) if s.trim().is_empty() => Err(AuthenticationFailure::MissingActorId),
        JsonValue::String(s) => Ok(s.trim().parse().ok()),
        _ => Ok(None),
    }
}

/// Decide whether the request payload may exercise `capability`
///
/// Returns the resolved principal on allow. The store is consulted only once
/// an actor id has been found.
pub async fn decide(
    payload: Option<&JsonValue>,
    capability: Capability,
    store: &dyn PrincipalStore,
) -> Result<Principal, GuardError> {
    let payload = payload
        .filter(|p| !p.is_null())
        .ok_or(GuardError::Authentication(AuthenticationFailure::MissingCredentials))?;

    let id = actor_id(payload)
        .map_err(GuardError::Authentication)?
        .ok_or(GuardError::Authentication(AuthenticationFailure::UnknownActor))?;

    let record = store
        .find_principal(id)
        .await
        .map_err(|e| GuardError::Infrastructure(e.to_string()))?
        .ok_or(GuardError::Authentication(AuthenticationFailure::UnknownActor))?;

    let principal =
        Principal::try_from(record).map_err(|e| GuardError::Infrastructure(e.to_string()))?;

    match evaluate(&principal, capability) {
        Decision::Allow => Ok(principal),
        Decision::Deny => Err(GuardError::Authorization {
            actor_id: principal.id,
            role: principal.role.to_string(),
            capability,
        }),
    }
}

/// Shared handle to the guard and its principal store
#[derive(Clone)]
pub struct AccessGuard {
    store: Arc<dyn PrincipalStore>,
    body_limit: usize,
}

impl AccessGuard {
    pub fn new(store: Arc<dyn PrincipalStore>, body_limit: usize) -> Self {
        Self { store, body_limit }
    }

    /// Largest request body the guard will buffer
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Run [`decide`] and log the outcome
    pub async fn authorize(
        &self,
        payload: Option<&JsonValue>,
        capability: Capability,
    ) -> Result<Principal, GuardError> {
        let outcome = decide(payload, capability, self.store.as_ref()).await;

        match &outcome {
            Ok(principal) => {
                debug!(actor_id = principal.id, %capability, "Access granted");
            },
            Err(GuardError::Authentication(failure)) => {
                warn!(%capability, reason = %failure, "Access denied: unauthenticated");
            },
            Err(GuardError::Authorization { actor_id, role, .. }) => {
                warn!(actor_id, role = %role, %capability, "Access denied: missing capability");
            },
            Err(GuardError::Infrastructure(cause)) => {
                error!(%capability, error = %cause, "Access check failed");
            },
        }

        outcome
    }

    /// Layer that protects a route with `capability`
    pub fn require(&self, capability: Capability) -> RequireCapability {
        RequireCapability::new(self.clone(), capability)
    }
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::capability::{self, DEVICES_CREATE, DEVICES_DELETE};
    use crate::access::principal::{PermissionSet, PrincipalRecord, Role};
    use crate::access::store::{InMemoryPrincipalStore, StoreError};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::json;

    struct FailingStore;

    #[async_trait]
    impl PrincipalStore for FailingStore {
        async fn find_principal(&self, _id: i64) -> Result<Option<PrincipalRecord>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn record(id: i64, role: &str, permissions: Option<JsonValue>) -> PrincipalRecord {
        PrincipalRecord {
            id,
            name: format!("user-{id}"),
            role: role.to_string(),
            permissions,
        }
    }

    fn payload(id: JsonValue) -> JsonValue {
        json!({ "currentUser": { "id": id, "nome": "Ana" }, "model": "X" })
    }

    fn store() -> InMemoryPrincipalStore {
        InMemoryPrincipalStore::new()
            .with(record(1, "administrator", None))
            .with(record(7, "technician", Some(json!({"devices_create": true}))))
            .with(record(8, "technician", Some(json!({"devices_create": false}))))
            .with(record(9, "technician", Some(json!([1, 2, 3]))))
    }

    #[tokio::test]
    async fn test_administrator_always_allowed() {
        let store = store();
        for cap in capability::ALL {
            let principal = decide(Some(&payload(json!(1))), *cap, &store).await.unwrap();
            assert_eq!(principal.role, Role::Administrator);
        }
    }

    #[tokio::test]
    async fn test_granted_capability_allowed() {
        let principal = decide(Some(&payload(json!(7))), DEVICES_CREATE, &store()).await.unwrap();
        assert_eq!(principal.id, 7);
        assert_eq!(principal.display_name, "user-7");
    }

    #[tokio::test]
    async fn test_absent_capability_forbidden() {
        let err = decide(Some(&payload(json!(7))), DEVICES_DELETE, &store()).await.unwrap_err();
        assert!(matches!(err, GuardError::Authorization { actor_id: 7, .. }));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_false_capability_forbidden() {
        let err = decide(Some(&payload(json!(8))), DEVICES_CREATE, &store()).await.unwrap_err();
        assert!(matches!(err, GuardError::Authorization { .. }));
    }

    #[tokio::test]
    async fn test_missing_payload_never_touches_store() {
        let store = store();
        let err = decide(None, DEVICES_CREATE, &store).await.unwrap_err();
        assert!(matches!(
            err,
            GuardError::Authentication(AuthenticationFailure::MissingCredentials)
        ));

        let err = decide(Some(&JsonValue::Null), DEVICES_CREATE, &store).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_missing_actor_id_never_touches_store() {
        let store = store();
        let bodies = [
            json!({ "model": "X" }),
            json!({ "currentUser": {} }),
            json!({ "currentUser": { "id": null } }),
            json!({ "currentUser": { "id": 0 } }),
            json!({ "currentUser": { "id": "" } }),
            json!({ "currentUser": "7" }),
            json!([]),
        ];
        for body in &bodies {
            let err = decide(Some(body), DEVICES_CREATE, &store).await.unwrap_err();
            assert!(
                matches!(err, GuardError::Authentication(AuthenticationFailure::MissingActorId)),
                "body {body} gave {err:?}"
            );
        }
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_unknown_actor_is_unauthenticated() {
        let store = store();
        let err = decide(Some(&payload(json!(404))), DEVICES_CREATE, &store).await.unwrap_err();
        assert!(matches!(err, GuardError::Authentication(AuthenticationFailure::UnknownActor)));
        assert_eq!(store.lookups(), 1);

        let err = decide(Some(&payload(json!("abc"))), DEVICES_CREATE, &store).await.unwrap_err();
        assert!(matches!(err, GuardError::Authentication(AuthenticationFailure::UnknownActor)));
    }

    #[tokio::test]
    async fn test_numeric_string_id_resolves() {
        let principal = decide(Some(&payload(json!(" 7 "))), DEVICES_CREATE, &store()).await.unwrap();
        assert_eq!(principal.id, 7);
    }

    #[tokio::test]
    async fn test_store_failure_is_infrastructure() {
        let err = decide(Some(&payload(json!(7))), DEVICES_CREATE, &FailingStore).await.unwrap_err();
        assert!(matches!(err, GuardError::Infrastructure(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_malformed_permissions_is_infrastructure() {
        let err = decide(Some(&payload(json!(9))), DEVICES_CREATE, &store()).await.unwrap_err();
        assert!(matches!(err, GuardError::Infrastructure(_)));
    }

    #[tokio::test]
    async fn test_decision_is_repeatable_and_sees_store_changes() {
        let store = store();
        let body = payload(json!(8));

        let first = decide(Some(&body), DEVICES_CREATE, &store).await.is_ok();
        let second = decide(Some(&body), DEVICES_CREATE, &store).await.is_ok();
        assert_eq!(first, second);
        assert!(!first);

        store.insert(record(8, "technician", Some(json!({"devices_create": true}))));
        assert!(decide(Some(&body), DEVICES_CREATE, &store).await.is_ok());
        assert_eq!(store.lookups(), 3);
    }

    #[tokio::test]
    async fn test_guard_error_response_bodies() {
        let response = GuardError::Infrastructure("pool timed out".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response =
            GuardError::Authentication(AuthenticationFailure::MissingCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn principal(role: &str, permissions: PermissionSet) -> Principal {
        Principal {
            id: 42,
            display_name: "prop".into(),
            role: Role::from(role),
            permissions,
        }
    }

    fn grants() -> impl Strategy<Value = std::collections::BTreeMap<String, bool>> {
        let keys = prop::sample::select(
            capability::ALL.iter().map(|c| c.key().to_string()).collect::<Vec<_>>(),
        );
        prop::collection::btree_map(keys, any::<bool>(), 0..8)
    }

    proptest! {
        #[test]
        fn prop_administrator_ignores_permissions(
            map in grants(),
            index in 0..capability::ALL.len(),
        ) {
            let admin = principal("administrator", map.into_iter().collect());
            prop_assert_eq!(evaluate(&admin, capability::ALL[index]), Decision::Allow);
        }

        #[test]
        fn prop_others_allowed_iff_granted(
            role in "[a-z]{3,12}",
            map in grants(),
            index in 0..capability::ALL.len(),
        ) {
            prop_assume!(role != "administrator");
            let cap = capability::ALL[index];
            let expected = if map.get(cap.key()) == Some(&true) {
                Decision::Allow
            } else {
                Decision::Deny
            };
            let actor = principal(&role, map.into_iter().collect());
            prop_assert_eq!(evaluate(&actor, cap), expected);
        }
    }
}
