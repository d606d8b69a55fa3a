//! SmartControl Server Library
//!
//! Inventory backend for company phones and lines: employees, devices, lines,
//! assignment terms and maintenance orders.
//!
//! # Overview
//!
//! - **Access guard**: every mutating route names the capability it needs.
//!   The acting principal is resolved from the request payload and the
//!   `users` table on each request.
//! - **Audit recorder**: every committed mutation appends one entry to
//!   `audit_log`. Audit failures are logged and never change the response.
//! - **Feature slices**: commands and queries per resource, see [`features`].
//!
//! ## Error Handling
//!
//! Commands return their own `thiserror` enums, converted into
//! [`AppError`] at the route boundary. Responses share one envelope:
//! `{success, data, meta?}` or `{success: false, error: {code, message}}`.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extractors
//! - **SQLx**: PostgreSQL access and migrations
//! - **Tower**: middleware and the guard layer
//!
//! # Example
//!
//! ```no_run
//! use smartcontrol_server::{config::Config, db, features::FeatureState, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let app = server::create_app(FeatureState::new(pool, &config), &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod server;

pub use error::{ApiResult, AppError};
