//! Bulk device import from CSV
//!
//! Columns: model, imei1, condition, imei2 (optional), notes (optional).

use axum::extract::Multipart;
use csv::StringRecord;
use sqlx::{Acquire, PgPool};

use super::create::{CreateDeviceCommand, NewDevice};
use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::import::{
    cell, data_rows, read_csv, require_columns, ImportError, ImportSummary, IMPORT_TARGET,
};

#[derive(Debug, thiserror::Error)]
pub enum ImportDevicesError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ImportDevicesError> for AppError {
    fn from(err: ImportDevicesError) -> Self {
        match err {
            ImportDevicesError::Import(e) => e.into(),
            ImportDevicesError::Database(e) => AppError::Database(e),
        }
    }
}

fn parse_row(record: &StringRecord) -> Result<NewDevice, String> {
    require_columns(record, 3)?;
    CreateDeviceCommand {
        model: cell(record, 0),
        imei1: cell(record, 1),
        condition: cell(record, 2),
        imei2: cell(record, 3),
        notes: cell(record, 4),
        line_id: None,
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
) -> Result<ImportSummary, ImportDevicesError> {
    let contents = read_csv(multipart).await?;
    let mut summary = ImportSummary::default();

    let mut tx = pool.begin().await?;
    for (line, record) in data_rows(&contents) {
        let device = match record.and_then(|r| parse_row(&r)) {
            Ok(device) => device,
            Err(reason) => {
                summary.failed(line, reason);
                continue;
            },
        };

        let mut savepoint = Acquire::begin(&mut tx).await?;
        let result = sqlx::query(
            r#"
            INSERT INTO devices (model, imei1, imei2, condition, notes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (imei1) DO NOTHING
            "#,
        )
        .bind(&device.model)
        .bind(&device.imei1)
        .bind(&device.imei2)
        .bind(device.condition.as_str())
        .bind(&device.notes)
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
                tracing::warn!(line, imei = %device.imei1, error = %e, "Device import row failed");
                summary.failed(line, format!("IMEI {}: unexpected error", device.imei1));
            },
        }
    }
    tx.commit().await?;

    let summary = summary.finish("devices");
    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        failed = summary.failures.len(),
        "Device import finished"
    );

    recorder
        .record(
            AuditEvent::new(AuditAction::Import, ResourceType::Device, IMPORT_TARGET)
                .by(principal)
                .details(&summary),
        )
        .await;

    Ok(summary)
}
