//! Line assignment terms
//!
//! Each line has at most one `Active` term. Issuing a new term retires the
//! previous one in the same transaction.

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use commands::{CreateLineTermCommand, CreateLineTermError};
pub use models::LineTerm;
pub use routes::line_terms_routes;
