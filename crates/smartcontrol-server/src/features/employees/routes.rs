//! Employee API routes
//!
//! - `GET /api/v1/employees` - List employees
//! - `POST /api/v1/employees` - Create an employee (`employees_create`)
//! - `POST /api/v1/employees/import` - Bulk import from CSV (`employees_import`)
//! - `PUT /api/v1/employees/:id` - Update an employee (`employees_update`)
//! - `DELETE /api/v1/employees/:id` - Delete an employee (`employees_delete`)
//! - `GET /api/v1/employees/:id/history` - Device assignments of an employee

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use super::commands::{self, EmployeeCommand};
use super::queries::{self, EmployeeAssignment};
use super::Employee;
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn employees_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_employees))
        .route(
            "/",
            post(create_employee).route_layer(guard.require(capability::EMPLOYEES_CREATE)),
        )
        .route(
            "/import",
            post(import_employees).route_layer(guard.require(capability::EMPLOYEES_IMPORT)),
        )
        .route(
            "/:id",
            put(update_employee).route_layer(guard.require(capability::EMPLOYEES_UPDATE)),
        )
        .route(
            "/:id",
            delete(delete_employee).route_layer(guard.require(capability::EMPLOYEES_DELETE)),
        )
        .route("/:id/history", get(employee_history))
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn create_employee(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<EmployeeCommand>,
) -> ApiResult<Response> {
    let employee = commands::create::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::created(employee))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, employee_id = id))]
async fn update_employee(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(command): Json<EmployeeCommand>,
) -> ApiResult<ApiResponse<Employee>> {
    let employee = commands::update::handle(&pool, &recorder, &principal, id, command).await?;
    Ok(ApiResponse::success(employee))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, employee_id = id))]
async fn delete_employee(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<JsonValue>> {
    let name = commands::delete::handle(&pool, &recorder, &principal, id).await?;
    Ok(ApiResponse::success(json!({
        "id": id,
        "message": format!("Employee {name} deleted"),
    })))
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn import_employees(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let summary = commands::import::handle(&pool, &recorder, &principal, &mut multipart).await?;
    Ok(ApiResponse::created(summary))
}

async fn list_employees(State(pool): State<PgPool>) -> ApiResult<ApiResponse<Vec<Employee>>> {
    Ok(ApiResponse::success(queries::list::handle(&pool).await?))
}

async fn employee_history(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Vec<EmployeeAssignment>>> {
    Ok(ApiResponse::success(queries::history::handle(&pool, id).await?))
}
