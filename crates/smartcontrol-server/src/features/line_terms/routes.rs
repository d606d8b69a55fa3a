//! Line term API routes
//!
//! - `GET /api/v1/line-records` - List terms
//! - `POST /api/v1/line-records` - Issue a term (`line_records_create`)

use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use sqlx::PgPool;

use super::commands::{self, CreateLineTermCommand};
use super::queries;
use super::LineTerm;
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn line_terms_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new().route("/", get(list_terms)).route(
        "/",
        post(create_term).route_layer(guard.require(capability::LINE_RECORDS_CREATE)),
    )
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn create_term(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<CreateLineTermCommand>,
) -> ApiResult<Response> {
    let term = commands::create::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::created(term))
}

async fn list_terms(State(pool): State<PgPool>) -> ApiResult<ApiResponse<Vec<LineTerm>>> {
    Ok(ApiResponse::success(queries::list::handle(&pool).await?))
}
