//! Saving uploads to disk

use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::AppError;
use crate::features::shared::multipart::{UploadError, UploadedFile};

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Public path prefix the server mounts the upload directory at
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum UploadFileError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("File type not allowed: '{0}'")]
    NotAllowed(String),

    #[error("Invalid file name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadFileError> for AppError {
    fn from(err: UploadFileError) -> Self {
        match err {
            UploadFileError::Upload(e) => e.into(),
            UploadFileError::NotAllowed(_) => AppError::BadRequest(err.to_string()),
            UploadFileError::Pattern(_) => AppError::Internal(err.to_string()),
            UploadFileError::Io(e) => AppError::Io(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub file_url: String,
}

pub fn is_allowed(file: &UploadedFile) -> bool {
    file.extension()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

static UNSAFE_CHARS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]"));

/// Replace anything outside `[A-Za-z0-9._-]` and strip leading dots
pub fn sanitize_file_name(name: &str) -> Result<String, regex::Error> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let unsafe_chars = UNSAFE_CHARS.as_ref().map_err(Clone::clone)?;
    let cleaned = unsafe_chars.replace_all(base, "_");
    Ok(cleaned.trim_start_matches('.').to_string())
}

#[tracing::instrument(skip(dir, file), fields(file_name = %file.file_name, size = file.contents.len()))]
pub async fn store(dir: &Path, file: UploadedFile) -> Result<StoredFile, UploadFileError> {
    if !is_allowed(&file) {
        tracing::warn!("Rejected upload with disallowed extension");
        return Err(UploadFileError::NotAllowed(file.file_name));
    }

    let name = format!(
        "{}_{}",
        Utc::now().format("%Y%m%d%H%M%S%3f"),
        sanitize_file_name(&file.file_name)?
    );

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&name), &file.contents).await?;

    tracing::info!(stored_as = %name, "Upload stored");

    Ok(StoredFile {
        file_url: format!("{PUBLIC_PREFIX}/{name}"),
    })
}
