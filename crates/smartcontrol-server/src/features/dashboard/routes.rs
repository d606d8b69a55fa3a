//! - `GET /api/v1/dashboard/stats` - Inventory counters

use axum::{extract::State, routing::get, Router};
use sqlx::PgPool;

use super::queries::{self, DashboardStats};
use crate::api::ApiResponse;
use crate::features::FeatureState;

pub fn dashboard_routes() -> Router<FeatureState> {
    Router::new().route("/stats", get(get_stats))
}

/// Falls back to zeroed counters when the database fails
async fn get_stats(State(pool): State<PgPool>) -> ApiResponse<DashboardStats> {
    match queries::stats(&pool).await {
        Ok(stats) => ApiResponse::success(stats),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to load dashboard stats");
            ApiResponse::success(DashboardStats::default())
        },
    }
}
