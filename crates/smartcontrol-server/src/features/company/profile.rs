//! Read and upsert the company row

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use super::logo::{Logo, LogoError};
use crate::access::Principal;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, ResourceType};
use crate::error::AppError;
use crate::features::shared::{optional_text, required_text, ValidationError, MAX_TEXT_LENGTH};

/// Primary key of the only company row
pub const COMPANY_ID: i16 = 1;

pub const DEFAULT_COMPANY_NAME: &str = "System Report";
pub const DEFAULT_TAX_ID: &str = "Not provided";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    pub tax_id: Option<String>,
    /// Data URL, or null when no logo is stored
    pub logo: Option<String>,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_COMPANY_NAME.to_string(),
            tax_id: Some(DEFAULT_TAX_ID.to_string()),
            logo: None,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    name: String,
    tax_id: Option<String>,
    logo: Option<Vec<u8>>,
    logo_mime: Option<String>,
}

impl From<CompanyRow> for CompanyProfile {
    fn from(row: CompanyRow) -> Self {
        let logo = row.logo.map(|bytes| {
            Logo {
                mime: row.logo_mime.unwrap_or_else(|| super::logo::DEFAULT_LOGO_MIME.to_string()),
                bytes,
            }
            .to_data_url()
        });
        Self {
            name: row.name,
            tax_id: row.tax_id,
            logo,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyCommand {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    /// Omitted or empty keeps the current logo
    pub logo: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateCompanyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Logo(#[from] LogoError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateCompanyError> for AppError {
    fn from(err: UpdateCompanyError) -> Self {
        match err {
            UpdateCompanyError::Validation(e) => e.into(),
            UpdateCompanyError::Logo(_) => AppError::Validation(err.to_string()),
            UpdateCompanyError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn get(pool: &PgPool) -> Result<CompanyProfile, sqlx::Error> {
    let row = sqlx::query_as::<_, CompanyRow>(
        "SELECT name, tax_id, logo, logo_mime FROM company WHERE id = $1",
    )
    .bind(COMPANY_ID)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(CompanyProfile::from).unwrap_or_default())
}

#[tracing::instrument(skip(pool, recorder, principal, command))]
pub async fn update(
    pool: &PgPool,
    recorder: &AuditRecorder,
    principal: &Principal,
    command: UpdateCompanyCommand,
) -> Result<CompanyProfile, UpdateCompanyError> {
    let name = required_text("name", command.name.as_deref(), MAX_TEXT_LENGTH)?;
    let tax_id = optional_text("taxId", command.tax_id.as_deref(), MAX_TEXT_LENGTH)?;
    let logo = match command.logo.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(Logo::parse(raw)?),
        _ => None,
    };

    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, CompanyRow>(
        r#"
        INSERT INTO company (id, name, tax_id, logo, logo_mime)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            tax_id = EXCLUDED.tax_id,
            logo = COALESCE(EXCLUDED.logo, company.logo),
            logo_mime = COALESCE(EXCLUDED.logo_mime, company.logo_mime),
            updated_at = NOW()
        RETURNING name, tax_id, logo, logo_mime
        "#,
    )
    .bind(COMPANY_ID)
    .bind(&name)
    .bind(&tax_id)
    .bind(logo.as_ref().map(|l| l.bytes.as_slice()))
    .bind(logo.as_ref().map(|l| l.mime.as_str()))
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(name = %name, logo_changed = logo.is_some(), "Company profile updated");

    recorder
        .record(
            AuditEvent::new(AuditAction::Update, ResourceType::Company, COMPANY_ID)
                .by(principal)
                .details(&json!({
                    "name": &name,
                    "taxId": &tax_id,
                    "logoChanged": logo.is_some(),
                })),
        )
        .await;

    Ok(row.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let body = serde_json::to_value(CompanyProfile::default()).unwrap();
        assert_eq!(body, json!({"name": "System Report", "taxId": "Not provided", "logo": null}));
    }

    #[test]
    fn test_row_renders_logo_as_data_url() {
        let profile = CompanyProfile::from(CompanyRow {
            name: "Acme".into(),
            tax_id: None,
            logo: Some(vec![0, 1, 2]),
            logo_mime: None,
        });
        assert_eq!(profile.logo.as_deref(), Some("data:image/png;base64,AAEC"));
    }
}
