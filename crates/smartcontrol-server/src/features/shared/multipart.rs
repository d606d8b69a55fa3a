//! Reading uploaded files out of multipart forms

use crate::error::AppError;
use axum::extract::multipart::{Multipart, MultipartError};
use thiserror::Error;

/// Form field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file was sent")]
    MissingFile,

    #[error("No file was selected")]
    EmptyFileName,

    #[error("Malformed multipart body: {0}")]
    Malformed(#[from] MultipartError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub contents: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased extension of the client-supplied name
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Consume the form until the `file` field, skipping everything else
pub async fn read_file(multipart: &mut Multipart) -> Result<UploadedFile, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().trim().to_string();
        if file_name.is_empty() {
            return Err(UploadError::EmptyFileName);
        }
        let content_type = field.content_type().map(str::to_string);
        let contents = field.bytes().await?.to_vec();

        return Ok(UploadedFile {
            file_name,
            content_type,
            contents,
        });
    }

    Err(UploadError::MissingFile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            contents: Vec::new(),
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(file("term.PDF").extension().as_deref(), Some("pdf"));
        assert_eq!(file("archive.tar.gz").extension().as_deref(), Some("gz"));
        assert_eq!(file("README").extension(), None);
        assert_eq!(file("trailing.").extension(), None);
    }
}
