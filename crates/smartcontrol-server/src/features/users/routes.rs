//! User API routes
//!
//! - `GET /api/v1/users` - List users
//! - `POST /api/v1/users` - Create a user (`users_create`)
//! - `PUT /api/v1/users/:id` - Update a user (`users_update`)
//! - `DELETE /api/v1/users/:id` - Delete a user (`users_delete`)

use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use super::commands::{self, CreateUserCommand, UpdateUserCommand};
use super::queries;
use super::UserProfile;
use crate::access::{capability, AccessGuard, Principal};
use crate::api::ApiResponse;
use crate::audit::AuditRecorder;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn users_routes(guard: &AccessGuard) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_users))
        .route(
            "/",
            post(create_user).route_layer(guard.require(capability::USERS_CREATE)),
        )
        .route(
            "/:id",
            put(update_user).route_layer(guard.require(capability::USERS_UPDATE)),
        )
        .route(
            "/:id",
            delete(delete_user).route_layer(guard.require(capability::USERS_DELETE)),
        )
}

async fn list_users(State(pool): State<PgPool>) -> ApiResult<ApiResponse<Vec<UserProfile>>> {
    Ok(ApiResponse::success(queries::list::handle(&pool).await?))
}

#[tracing::instrument(skip_all, fields(actor = principal.id))]
async fn create_user(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Json(command): Json<CreateUserCommand>,
) -> ApiResult<Response> {
    let user = commands::create::handle(&pool, &recorder, &principal, command).await?;
    Ok(ApiResponse::created(user))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, user_id = id))]
async fn update_user(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(command): Json<UpdateUserCommand>,
) -> ApiResult<ApiResponse<UserProfile>> {
    let user = commands::update::handle(&pool, &recorder, &principal, id, command).await?;
    Ok(ApiResponse::success(user))
}

#[tracing::instrument(skip_all, fields(actor = principal.id, user_id = id))]
async fn delete_user(
    State(pool): State<PgPool>,
    State(recorder): State<AuditRecorder>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<JsonValue>> {
    let username = commands::delete::handle(&pool, &recorder, &principal, id).await?;
    Ok(ApiResponse::success(json!({
        "id": id,
        "message": format!("User {username} deleted"),
    })))
}
