//! Feature modules implementing the SmartControl API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes. Mutating routes are wrapped in the access guard and record one
//! audit entry after their transaction commits.
//!
//! # Features
//!
//! - **auth**: login against stored bcrypt hashes
//! - **users**: principal management
//! - **employees**, **lines**, **devices**: inventory CRUD, history and CSV import
//! - **records**: device assignment terms
//! - **maintenance**: service orders
//! - **line_terms**: line assignment terms
//! - **audit_trail**: read access to the audit log
//! - **dashboard**: aggregated counters
//! - **company**: the single company profile
//! - **uploads**: term documents and police reports
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (create, update, delete, import)
//! - `queries/` - Read operations (get, list, history)
//! - `routes.rs` - HTTP route definitions

pub mod audit_trail;
pub mod auth;
pub mod company;
pub mod dashboard;
pub mod devices;
pub mod employees;
pub mod line_terms;
pub mod lines;
pub mod maintenance;
pub mod records;
pub mod shared;
pub mod uploads;
pub mod users;

use crate::access::{AccessGuard, PgPrincipalStore};
use crate::audit::AuditRecorder;
use crate::config::{Config, UploadConfig};
use axum::{extract::DefaultBodyLimit, extract::FromRef, Router};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared state for all feature routes
#[derive(Clone, FromRef)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: PgPool,
    pub guard: AccessGuard,
    pub recorder: AuditRecorder,
    /// Upload directory and body size limit
    pub uploads: UploadConfig,
}

impl FeatureState {
    /// Wire the guard and recorder to the given pool
    pub fn new(db: PgPool, config: &Config) -> Self {
        let guard = AccessGuard::new(
            Arc::new(PgPrincipalStore::new(db.clone())),
            config.uploads.max_bytes,
        );
        let recorder = AuditRecorder::postgres(db.clone());
        Self {
            db,
            guard,
            recorder,
            uploads: config.uploads.clone(),
        }
    }
}

/// Creates the API router with all feature routes mounted
///
/// Mounted under `/api/v1` by the server.
pub fn router(state: FeatureState) -> Router<()> {
    let guard = state.guard.clone();
    let body_limit = state.uploads.max_bytes;

    Router::new()
        .nest("/auth", auth::auth_routes())
        .nest("/users", users::users_routes(&guard))
        .nest("/employees", employees::employees_routes(&guard))
        .nest("/lines", lines::lines_routes(&guard))
        .nest("/devices", devices::devices_routes(&guard))
        .nest("/records", records::records_routes(&guard))
        .nest("/maintenance", maintenance::maintenance_routes(&guard))
        .nest("/line-records", line_terms::line_terms_routes(&guard))
        .nest("/audit", audit_trail::audit_routes())
        .nest("/dashboard", dashboard::dashboard_routes())
        .nest("/company", company::company_routes(&guard))
        .nest("/upload", uploads::upload_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
