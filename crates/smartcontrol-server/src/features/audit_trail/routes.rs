//! Audit API routes
//!
//! - `GET /api/v1/audit?user_id=&action=&resource=&target_id=&start_time=&end_time=&limit=&offset=`
//! - `GET /api/v1/audit/:resource/:target_id` - Trail for one resource instance

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde_json::json;
use sqlx::PgPool;

use crate::api::ApiResponse;
use crate::audit::{queries, AuditEntry, AuditQuery, DEFAULT_AUDIT_QUERY_LIMIT};
use crate::error::{ApiResult, AppError};
use crate::features::FeatureState;

pub fn audit_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(search_entries))
        .route("/:resource/:target_id", get(resource_trail))
}

#[tracing::instrument(skip(pool))]
async fn search_entries(
    State(pool): State<PgPool>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<ApiResponse<Vec<AuditEntry>>> {
    query.validate().map_err(AppError::Validation)?;
    let entries = queries::search(&pool, &query).await?;
    Ok(ApiResponse::success_with_meta(
        entries,
        json!({ "limit": query.limit(), "offset": query.offset() }),
    ))
}

#[tracing::instrument(skip(pool))]
async fn resource_trail(
    State(pool): State<PgPool>,
    Path((resource, target_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Vec<AuditEntry>>> {
    let entries =
        queries::trail_for(&pool, &resource, &target_id, DEFAULT_AUDIT_QUERY_LIMIT).await?;
    Ok(ApiResponse::success(entries))
}
