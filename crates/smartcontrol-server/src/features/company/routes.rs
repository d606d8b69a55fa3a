//! Company API routes
//!
//! - `GET /api/v1/company` - Company profile
//! - `PUT /api/v1/company` - Upsert the profile (`company_update`)

use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};
use sqlx::PgPool;

use super::profile::{self, CompanyProfile, UpdateCompanyCommand};
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn company_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new().route("/", get(get_company)).route(
        "/",
        put(update_company).route_layer(guard.require(capability::COMPANY_UPDATE)),
    )
}

async fn get_company(State(pool): State<PgPool>) -> ApiResult<ApiResponse<CompanyProfile>> {
    Ok(ApiResponse::success(profile::get(&pool).await?))
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn update_company(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<UpdateCompanyCommand>,
) -> ApiResult<ApiResponse<CompanyProfile>> {
    let company = profile::update(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::success(company))
}
