//! - `POST /api/v1/auth/login` - `{username, password}`, returns the user profile

use axum::{extract::State, routing::post, Json, Router};
use sqlx::PgPool;

use super::login::{self, LoginCommand};
use crate::api::ApiResponse;
use crate::error::ApiResult;
use crate::features::users::UserProfile;
use crate::features::FeatureState;

pub fn auth_routes() -> Router<FeatureState> {
    Router::new().route("/login", post(login_user))
}

async fn login_user(
    State(pool): State<PgPool>,
    Json(command): Json<LoginCommand>,
) -> ApiResult<ApiResponse<UserProfile>> {
    Ok(ApiResponse::success(login::handle(&pool, command).await?))
}
