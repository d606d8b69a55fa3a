//! Device API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/devices` - List devices with their derived status
//! - `POST /api/v1/devices` - Register a device (`devices_create`)
//! - `POST /api/v1/devices/import` - Bulk import from CSV (`devices_import`)
//! - `GET /api/v1/devices/eligible-for-maintenance` - Idle defective or damaged devices
//! - `GET /api/v1/devices/:imei` - Get one device
//! - `PUT /api/v1/devices/:imei` - Update a device (`devices_update`)
//! - `DELETE /api/v1/devices/:imei` - Delete a device (`devices_delete`)
//! - `GET /api/v1/devices/:imei/history` - Usage and maintenance history

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use sqlx::PgPool;

use super::commands::{self, CreateDeviceCommand, UpdateDeviceCommand};
use super::queries;
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn devices_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_devices))
        .route(
            "/",
            post(create_device).route_layer(guard.require(capability::DEVICES_CREATE)),
        )
        .route(
            "/import",
            post(import_devices).route_layer(guard.require(capability::DEVICES_IMPORT)),
        )
        .route("/eligible-for-maintenance", get(list_eligible_devices))
        .route("/:imei", get(get_device))
        .route(
            "/:imei",
            put(update_device).route_layer(guard.require(capability::DEVICES_UPDATE)),
        )
        .route(
            "/:imei",
            delete(delete_device).route_layer(guard.require(capability::DEVICES_DELETE)),
        )
        .route("/:imei/history", get(device_history))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn create_device(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<CreateDeviceCommand>,
) -> ApiResult<Response> {
    let device = commands::create::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::created(device))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, imei = %imei))]
async fn update_device(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(imei): Path<String>,
    Json(mut command): Json<UpdateDeviceCommand>,
) -> ApiResult<ApiResponse<super::Device>> {
    command.imei = imei;
    let device = commands::update::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::success(device))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, imei = %imei))]
async fn delete_device(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(imei): Path<String>,
) -> ApiResult<ApiResponse<commands::DeleteDeviceResponse>> {
    let response = commands::delete::handle(&pool, &recorder, &principal, imei).await?;
    Ok(ApiResponse::success(response))
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn import_devices(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let summary = commands::import::handle(&pool, &recorder, &principal, &mut multipart).await?;
    Ok(ApiResponse::created(summary))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

async fn list_devices(State(pool): State<PgPool>) -> ApiResult<ApiResponse<Vec<super::Device>>> {
    let devices = queries::list::handle(&pool).await?;
    tracing::debug!(count = devices.len(), "Devices listed via API");
    Ok(ApiResponse::success(devices))
}

async fn list_eligible_devices(
    State(pool): State<PgPool>,
) -> ApiResult<ApiResponse<Vec<super::Device>>> {
    Ok(ApiResponse::success(queries::eligible::handle(&pool).await?))
}

async fn get_device(
    State(pool): State<PgPool>,
    Path(imei): Path<String>,
) -> ApiResult<ApiResponse<super::Device>> {
    Ok(ApiResponse::success(queries::get::handle(&pool, &imei).await?))
}

async fn device_history(
    State(pool): State<PgPool>,
    Path(imei): Path<String>,
) -> ApiResult<ApiResponse<queries::DeviceHistory>> {
    Ok(ApiResponse::success(queries::history::handle(&pool, &imei).await?))
}
