//! Complete an assignment record with the return details
//!
//! Only the fields present in the body change. Setting a return date marks
//! the record as returned, which frees the device.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::records::models::{self, AssignmentRecord};
use crate::features::shared::{optional_text, ValidationError, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordCommand {
    pub return_date: Option<NaiveDate>,
    pub return_condition: Option<String>,
    pub return_notes: Option<String>,
    pub return_term_url: Option<String>,
    pub police_report_url: Option<String>,
    pub return_checker: Option<String>,
    pub delivery_term_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReturnChanges {
    return_date: Option<NaiveDate>,
    return_condition: Option<String>,
    return_notes: Option<String>,
    return_term_url: Option<String>,
    police_report_url: Option<String>,
    return_checker: Option<String>,
    delivery_term_url: Option<String>,
}

impl ReturnChanges {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateRecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No valid fields to update")]
    NoFieldsToUpdate,

    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateRecordError> for AppError {
    fn from(err: UpdateRecordError) -> Self {
        match err {
            UpdateRecordError::Validation(e) => e.into(),
            UpdateRecordError::NoFieldsToUpdate => AppError::Validation(err.to_string()),
            UpdateRecordError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateRecordError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateRecordCommand {
    fn validate(&self) -> Result<ReturnChanges, UpdateRecordError> {
        let changes = ReturnChanges {
            return_date: self.return_date,
            return_condition: optional_text(
                "returnCondition",
                self.return_condition.as_deref(),
                MAX_TEXT_LENGTH,
            )?,
            return_notes: optional_text("returnNotes", self.return_notes.as_deref(), 2000)?,
            return_term_url: optional_text("returnTermUrl", self.return_term_url.as_deref(), 1024)?,
            police_report_url: optional_text(
                "policeReportUrl",
                self.police_report_url.as_deref(),
                1024,
            )?,
            return_checker: optional_text(
                "returnChecker",
                self.return_checker.as_deref(),
                MAX_TEXT_LENGTH,
            )?,
            delivery_term_url: optional_text(
                "deliveryTermUrl",
                self.delivery_term_url.as_deref(),
                1024,
            )?,
        };
        if changes.is_empty() {
            return Err(UpdateRecordError::NoFieldsToUpdate);
        }
        Ok(changes)
    }
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    id: i64,
    command: UpdateRecordCommand,
) -> Result<AssignmentRecord, UpdateRecordError> {
    let changes = command.validate()?;

    let mut tx = pool.begin().await?;
    let updated = sqlx::query(
        r#"
        UPDATE assignment_records SET
            return_date = COALESCE($1, return_date),
            status = CASE WHEN $1::DATE IS NULL THEN status ELSE 'Returned' END,
            return_condition = COALESCE($2, return_condition),
            return_notes = COALESCE($3, return_notes),
            return_term_url = COALESCE($4, return_term_url),
            police_report_url = COALESCE($5, police_report_url),
            return_checker = COALESCE($6, return_checker),
            delivery_term_url = COALESCE($7, delivery_term_url)
        WHERE id = $8
        "#,
    )
    .bind(changes.return_date)
    .bind(&changes.return_condition)
    .bind(&changes.return_notes)
    .bind(&changes.return_term_url)
    .bind(&changes.police_report_url)
    .bind(&changes.return_checker)
    .bind(&changes.delivery_term_url)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(UpdateRecordError::NotFound(id));
    }

    let record = models::find_by_id(&mut *tx, id)
        .await?
        .ok_or(UpdateRecordError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(record_id = id, status = %record.status, "Record updated");

    recorder
        .record(
            AuditEvent::new(AuditAction::Update, ResourceType::Record, id)
                .by(principal)
                .details(&json!({
                    "message": format!("Term {id} updated"),
                    "updatedData": &changes,
                })),
        )
        .await;

    Ok(record)
}
