//! Read access to the audit log
//!
//! Writes happen only through [`crate::audit::AuditRecorder`]; this slice
//! exposes no mutation.

pub mod routes;

pub use routes::audit_routes;
