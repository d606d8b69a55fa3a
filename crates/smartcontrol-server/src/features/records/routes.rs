//! Assignment record API routes
//!
//! - `GET /api/v1/records?status=&page=&per_page=` - Paginated list
//! - `POST /api/v1/records` - Deliver a device (`records_create`)
//! - `GET /api/v1/records/:id` - Get one record
//! - `PUT /api/v1/records/:id` - Record the return (`records_update`)
//! - `DELETE /api/v1/records/:id` - Delete a record (`records_delete`)

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use super::commands::{self, CreateRecordCommand, UpdateRecordCommand};
use super::queries::{self, ListRecordsParams};
use super::AssignmentRecord;
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn records_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_records))
        .route(
            "/",
            post(create_record).route_layer(guard.require(capability::RECORDS_CREATE)),
        )
        .route("/:id", get(get_record))
        .route(
            "/:id",
            put(update_record).route_layer(guard.require(capability::RECORDS_UPDATE)),
        )
        .route(
            "/:id",
            delete(delete_record).route_layer(guard.require(capability::RECORDS_DELETE)),
        )
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn create_record(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<CreateRecordCommand>,
) -> ApiResult<Response> {
    let record = commands::create::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::created(record))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, record_id = id))]
async fn update_record(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(command): Json<UpdateRecordCommand>,
) -> ApiResult<ApiResponse<AssignmentRecord>> {
    let record = commands::update::handle(&pool, &recorder, &principal, id, command).await?;
    Ok(ApiResponse::success(record))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, record_id = id))]
async fn delete_record(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<JsonValue>> {
    commands::delete::handle(&pool, &recorder, &principal, id).await?;
    Ok(ApiResponse::success(json!({
        "id": id,
        "message": "Record deleted",
    })))
}

async fn list_records(
    State(pool): State<PgPool>,
    Query(params): Query<ListRecordsParams>,
) -> ApiResult<ApiResponse<Vec<AssignmentRecord>>> {
    let page = queries::list::handle(&pool, params).await?;
    tracing::debug!(
        count = page.items.len(),
        total = page.pagination.total,
        "Records listed via API"
    );
    Ok(ApiResponse::success_with_meta(
        page.items,
        json!({ "pagination": page.pagination }),
    ))
}

async fn get_record(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<AssignmentRecord>> {
    Ok(ApiResponse::success(queries::get::handle(&pool, id).await?))
}
