//! Line API routes
//!
//! - `GET /api/v1/lines` - List lines with the IMEI of the linked device
//! - `POST /api/v1/lines` - Register a line (`lines_create`)
//! - `POST /api/v1/lines/import` - Bulk import from CSV (`lines_import`)
//! - `PUT /api/v1/lines/:id` - Update a line (`lines_update`)
//! - `DELETE /api/v1/lines/:id` - Delete a line (`lines_delete`)
//! - `GET /api/v1/lines/:id/history` - Line terms

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use super::commands::{self, LineCommand};
use super::queries::{self, LineTermHistoryItem};
use super::Line;
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn lines_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_lines))
        .route(
            "/",
            post(create_line).route_layer(guard.require(capability::LINES_CREATE)),
        )
        .route(
            "/import",
            post(import_lines).route_layer(guard.require(capability::LINES_IMPORT)),
        )
        .route(
            "/:id",
            put(update_line).route_layer(guard.require(capability::LINES_UPDATE)),
        )
        .route(
            "/:id",
            delete(delete_line).route_layer(guard.require(capability::LINES_DELETE)),
        )
        .route("/:id/history", get(line_history))
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn create_line(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<LineCommand>,
) -> ApiResult<Response> {
    let line = commands::create::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::created(line))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, line_id = id))]
async fn update_line(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(command): Json<LineCommand>,
) -> ApiResult<ApiResponse<Line>> {
    let line = commands::update::handle(&pool, &recorder, &principal, id, command).await?;
    Ok(ApiResponse::success(line))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, line_id = id))]
async fn delete_line(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<JsonValue>> {
    let number = commands::delete::handle(&pool, &recorder, &principal, id).await?;
    Ok(ApiResponse::success(json!({
        "id": id,
        "message": format!("Line {number} deleted"),
    })))
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn import_lines(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let summary = commands::import::handle(&pool, &recorder, &principal, &mut multipart).await?;
    Ok(ApiResponse::created(summary))
}

async fn list_lines(State(pool): State<PgPool>) -> ApiResult<ApiResponse<Vec<Line>>> {
    Ok(ApiResponse::success(queries::list::handle(&pool).await?))
}

async fn line_history(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Vec<LineTermHistoryItem>>> {
    Ok(ApiResponse::success(queries::history::handle(&pool, id).await?))
}
