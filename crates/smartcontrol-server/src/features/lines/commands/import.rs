//! Bulk line import from CSV
//!
//! Columns: number, carrier, plan, status.

use axum::extract::Multipart;
use csv::StringRecord;
use sqlx::{Acquire, PgPool};

use super::create::{LineCommand, NewLine};
use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::import::{
    cell, data_rows, read_csv, require_columns, ImportError, ImportSummary, IMPORT_TARGET,
};

#[derive(Debug, thiserror::Error)]
pub enum ImportLinesError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ImportLinesError> for AppError {
    fn from(err: ImportLinesError) -> Self {
        match err {
            ImportLinesError::Import(e) => e.into(),
            ImportLinesError::Database(e) => AppError::Database(e),
        }
    }
}

fn parse_row(record: &StringRecord) -> Result<NewLine, String> {
    require_columns(record, 4)?;
    LineCommand {
        number: cell(record, 0),
        carrier: cell(record, 1),
        plan: cell(record, 2),
        status: cell(record, 3),
    }
    .validate()
    .map_err(|e| e.to_string())
}

#[tracing::instrument(skip_all)]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    multipart: &mut Multipart,
) -> Result<ImportSummary, ImportLinesError> {
    let contents = read_csv(multipart).await?;
    let mut summary = ImportSummary::default();

    let mut tx = pool.begin().await?;
    for (line_no, record) in data_rows(&contents) {
        let line = match record.and_then(|r| parse_row(&r)) {
            Ok(line) => line,
            Err(reason) => {
                summary.failed(line_no, reason);
                continue;
            },
        };

        let mut savepoint = Acquire::begin(&mut tx).await?;
        let result = sqlx::query(
            r#"
            INSERT INTO lines (number, carrier, plan, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (number) DO NOTHING
            "#,
        )
        .bind(&line.number)
        .bind(&line.carrier)
        .bind(&line.plan)
        .bind(&line.status)
        .execute(&mut *savepoint)
        .await;

        match result {
            Ok(done) => {
                savepoint.commit().await?;
                if done.rows_affected() > 0 {
                    summary.imported();
                } else {
                    summary.skipped();
                }
            },
            Err(e) => {
                savepoint.rollback().await?;
                tracing::warn!(line = line_no, error = %e, "Line import row failed");
                summary.failed(line_no, format!("line {}: unexpected error", line.number));
            },
        }
    }
    tx.commit().await?;

    let summary = summary.finish("lines");
    tracing::info!(imported = summary.imported, skipped = summary.skipped, "Line import finished");

    recorder
        .record(
            AuditEvent::new(AuditAction::Import, ResourceType::Line, IMPORT_TARGET)
                .by(principal)
                .details(&summary),
        )
        .await;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row() {
        let row = StringRecord::from(vec!["11999990000", "Vivo", "", "Active"]);
        let line = parse_row(&row).unwrap();
        assert_eq!(line.plan, None);

        let row = StringRecord::from(vec!["11999990000", "Vivo", "Corporate"]);
        assert!(parse_row(&row).unwrap_err().contains("4 columns"));
    }
}
