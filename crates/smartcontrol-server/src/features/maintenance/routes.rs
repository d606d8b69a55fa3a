//! Maintenance API routes
//!
//! - `GET /api/v1/maintenance` - List service orders
//! - `POST /api/v1/maintenance` - Open an order (`maintenance_create`)
//! - `GET /api/v1/maintenance/:id` - Get one order
//! - `PUT /api/v1/maintenance/:id` - Update an order (`maintenance_update`)
//! - `DELETE /api/v1/maintenance/:id` - Delete an order (`maintenance_delete`)

use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use super::commands::{self, CreateMaintenanceCommand, UpdateMaintenanceCommand};
use super::queries;
use super::MaintenanceOrder;
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn maintenance_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_orders))
        .route(
            "/",
            post(create_order).route_layer(guard.require(capability::MAINTENANCE_CREATE)),
        )
        .route("/:id", get(get_order))
        .route(
            "/:id",
            put(update_order).route_layer(guard.require(capability::MAINTENANCE_UPDATE)),
        )
        .route(
            "/:id",
            delete(delete_order).route_layer(guard.require(capability::MAINTENANCE_DELETE)),
        )
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn create_order(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<CreateMaintenanceCommand>,
) -> ApiResult<Response> {
    let order = commands::create::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::created(order))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, order_id = id))]
async fn update_order(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(command): Json<UpdateMaintenanceCommand>,
) -> ApiResult<ApiResponse<MaintenanceOrder>> {
    let order = commands::update::handle(&pool, &recorder, &principal, id, command).await?;
    Ok(ApiResponse::success(order))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, order_id = id))]
async fn delete_order(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<JsonValue>> {
    commands::delete::handle(&pool, &recorder, &principal, id).await?;
    Ok(ApiResponse::success(json!({
        "id": id,
        "message": "Maintenance order deleted",
    })))
}

async fn list_orders(State(pool): State<PgPool>) -> ApiResult<ApiResponse<Vec<MaintenanceOrder>>> {
    Ok(ApiResponse::success(queries::list::handle(&pool).await?))
}

async fn get_order(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<MaintenanceOrder>> {
    Ok(ApiResponse::success(queries::get::handle(&pool, id).await?))
}
