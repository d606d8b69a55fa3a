//! Capability-based access control for mutating routes
//!
//! Every protected route declares the capability it needs when the router is
//! built:
//!
//! ```rust,ignore
//! Router::new().route(
//!     "/",
//!     post(create_device).route_layer(guard.require(capability::DEVICES_CREATE)),
//! )
//! ```
//!
//! The layer resolves the acting principal from the request payload and the
//! `users` table on every request and answers 401, 403 or 500 before the
//! handler runs when the check fails.

pub mod capability;
pub mod credentials;
pub mod guard;
pub mod layer;
pub mod principal;
pub mod store;

pub use capability::Capability;
pub use guard::{
    decide, evaluate, AccessGuard, AuthenticationFailure, Decision, GuardError, ACTOR_FIELD,
};
pub use layer::RequireCapability;
pub use principal::{PermissionSet, Principal, PrincipalRecord, Role, ADMINISTRATOR_ROLE};
pub use store::{InMemoryPrincipalStore, PgPrincipalStore, PrincipalStore, StoreError};
