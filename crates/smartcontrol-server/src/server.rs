//! Router assembly and graceful shutdown

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::time::Duration;
use tokio::signal;
use tower_http::{compression::CompressionLayer, services::ServeDir};
use tracing::info;

use crate::config::Config;
use crate::features::{self, FeatureState};
use crate::{db, middleware};

/// Create the application router with all routes and middleware
pub fn create_app(state: FeatureState, config: &Config) -> Router {
    let pool = state.db.clone();

    Router::new()
        .route("/health", get(health_check))
        .with_state(pool)
        .nest("/api/v1", features::router(state))
        .nest_service("/uploads", ServeDir::new(&config.uploads.dir))
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn health_check(State(pool): State<PgPool>) -> Response {
    match db::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected"
                })),
            )
                .into_response()
        },
    }
}

/// Resolves on Ctrl+C or SIGTERM
///
/// After the signal, in-flight requests get `timeout_secs` to finish before
/// the process exits.
pub async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!(timeout_secs, "Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
