//! Login against stored bcrypt hashes
//!
//! Login only checks credentials and returns the profile. Authorization of
//! later requests is done per request by the access guard.

pub mod login;
pub mod routes;

pub use login::{LoginCommand, LoginError};
pub use routes::auth_routes;
