//! Principal management
//!
//! Users are the principals the access guard resolves. Password hashes
//! never leave this module.

pub mod bootstrap;
pub mod commands;
pub mod models;
pub mod password;
pub mod queries;
pub mod routes;

pub use bootstrap::{bootstrap_admin, BootstrapError};
pub use commands::{
    CreateUserCommand, CreateUserError, DeleteUserError, UpdateUserCommand, UpdateUserError,
};
pub use models::UserProfile;
pub use password::PasswordError;
pub use routes::users_routes;
