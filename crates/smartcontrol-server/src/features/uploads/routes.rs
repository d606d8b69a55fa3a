//! - `POST /api/v1/upload` - Multipart `file` field, returns `{fileUrl}`

use axum::{
    extract::{Multipart, State},
    response::Response,
    routing::post,
    Router,
};

use super::storage;
use crate::api::ApiResponse;
use crate::config::UploadConfig;
use crate::error::ApiResult;
use crate::features::shared::multipart;
use crate::features::FeatureState;

pub fn upload_routes() -> Router<FeatureState> {
    Router::new().route("/", post(upload_file))
}

async fn upload_file(
    State(uploads): State<UploadConfig>,
    mut form: Multipart,
) -> ApiResult<Response> {
    let file = multipart::read_file(&mut form).await?;
    let stored = storage::store(&uploads.dir, file).await?;
    Ok(ApiResponse::created(stored))
}
