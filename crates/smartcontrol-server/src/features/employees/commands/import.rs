//! Bulk employee import from CSV
//!
//! Columns: registration, name, position, email (optional).

use axum::extract::Multipart;
use csv::StringRecord;
use sqlx::{Acquire, PgPool};

use super::create::{EmployeeCommand, NewEmployee};
use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::import::{
    cell, data_rows, read_csv, require_columns, ImportError, ImportSummary, IMPORT_TARGET,
};

#[derive(Debug, thiserror::Error)]
pub enum ImportEmployeesError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ImportEmployeesError> for AppError {
    fn from(err: ImportEmployeesError) -> Self {
        match err {
            ImportEmployeesError::Import(e) => e.into(),
            ImportEmployeesError::Database(e) => AppError::Database(e),
        }
    }
}

fn parse_row(record: &StringRecord) -> Result<NewEmployee, String> {
    require_columns(record, 3)?;
    EmployeeCommand {
        registration: cell(record, 0),
        name: cell(record, 1),
        position: cell(record, 2),
        email: cell(record, 3),
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
) -> Result<ImportSummary, ImportEmployeesError> {
    let contents = read_csv(multipart).await?;
    let mut summary = ImportSummary::default();

    let mut tx = pool.begin().await?;
    for (line, record) in data_rows(&contents) {
        let employee = match record.and_then(|r| parse_row(&r)) {
            Ok(employee) => employee,
            Err(reason) => {
                summary.failed(line, reason);
                continue;
            },
        };

        let mut savepoint = Acquire::begin(&mut tx).await?;
        let result = sqlx::query(
            r#"
            INSERT INTO employees (registration, name, position, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (registration) DO NOTHING
            "#,
        )
        .bind(&employee.registration)
        .bind(&employee.name)
        .bind(&employee.position)
        .bind(&employee.email)
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
                tracing::warn!(line, error = %e, "Employee import row failed");
                summary.failed(line, format!("registration {}: unexpected error", employee.registration));
            },
        }
    }
    tx.commit().await?;

    let summary = summary.finish("employees");
    tracing::info!(imported = summary.imported, skipped = summary.skipped, "Employee import finished");

    recorder
        .record(
            AuditEvent::new(AuditAction::Import, ResourceType::Employee, IMPORT_TARGET)
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
        let row = StringRecord::from(vec!["1001", "Ana", "Technician"]);
        let employee = parse_row(&row).unwrap();
        assert_eq!(employee.email, None);

        let row = StringRecord::from(vec!["1001", "Ana", "Technician", "bad-email"]);
        assert!(parse_row(&row).unwrap_err().contains("email"));

        let row = StringRecord::from(vec!["1001", "Ana"]);
        assert!(parse_row(&row).is_err());
    }
}
