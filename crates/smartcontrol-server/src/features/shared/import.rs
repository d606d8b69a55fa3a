//! CSV bulk import plumbing
//!
//! Every import reads the `file` field of a multipart form, skips the header
//! row and inserts the remaining rows one by one under a savepoint. Duplicate
//! rows are skipped and invalid rows are reported back without aborting the
//! rest of the file.

use super::multipart::{read_file, UploadError};
use crate::error::AppError;
use axum::extract::Multipart;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use thiserror::Error;

/// Audit target used for bulk imports
pub const IMPORT_TARGET: &str = "Multiple";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Only .csv files can be imported")]
    NotCsv,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Upload(e) => e.into(),
            ImportError::NotCsv => AppError::BadRequest(err.to_string()),
            ImportError::Database(e) => AppError::Database(e),
        }
    }
}

/// Read the uploaded CSV contents
pub async fn read_csv(multipart: &mut Multipart) -> Result<Vec<u8>, ImportError> {
    let file = read_file(multipart).await?;
    match file.extension().as_deref() {
        Some("csv") | Some("txt") => Ok(file.contents),
        _ => Err(ImportError::NotCsv),
    }
}

/// Data rows with their 1-based line number in the file
pub fn data_rows(contents: &[u8]) -> Vec<(usize, Result<StringRecord, String>)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(contents);

    reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            let position = match &record {
                Ok(r) => r.position(),
                Err(e) => e.position(),
            };
            let line = position
                .map(|p| line_at(contents, p.byte() as usize))
                .unwrap_or(index + 2);
            (line, record.map_err(|e| e.to_string()))
        })
        .filter(|(_, record)| !matches!(record, Ok(r) if r.iter().all(str::is_empty)))
        .collect()
}

/// Line number of the first content at or after `offset`
///
/// The reader does not count skipped blank lines, so lines are derived from
/// the byte offset instead.
fn line_at(contents: &[u8], offset: usize) -> usize {
    let mut start = offset.min(contents.len());
    while matches!(contents.get(start), Some(b'\n' | b'\r')) {
        start += 1;
    }
    contents[..start].iter().filter(|b| **b == b'\n').count() + 1
}

/// Trimmed non-empty cell at `index`
pub fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Reject rows shorter than `min_columns`
pub fn require_columns(record: &StringRecord, min_columns: usize) -> Result<(), String> {
    if record.len() < min_columns {
        return Err(format!(
            "expected at least {min_columns} columns, found {}",
            record.len()
        ));
    }
    Ok(())
}

/// Outcome returned to the client and stored as the audit details
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub message: String,
    pub imported: u64,
    pub skipped: u64,
    pub failures: Vec<String>,
}

impl ImportSummary {
    pub fn imported(&mut self) {
        self.imported += 1;
    }

    pub fn skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn failed(&mut self, line: usize, reason: impl std::fmt::Display) {
        self.failures.push(format!("Row {line}: {reason}"));
    }

    /// Fill in the human readable message for `noun` ("devices", "lines", ...)
    pub fn finish(mut self, noun: &str) -> Self {
        self.message = format!(
            "Import finished: {} {noun} imported, {} skipped as duplicates, {} failed",
            self.imported,
            self.skipped,
            self.failures.len()
        );
        self
    }
}
