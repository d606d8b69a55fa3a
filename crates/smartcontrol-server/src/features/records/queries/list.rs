//! Paginated record listing, newest delivery first

use serde::Deserialize;
use smartcontrol_common::types::AssignmentStatus;
use sqlx::PgPool;

use super::RecordQueryError;
use crate::api::PaginationMeta;
use crate::features::records::models::{AssignmentRecord, RECORD_SELECT};
use crate::features::shared::PaginationParams;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRecordsParams {
    /// `In use`, `Returned` or `All`
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(AssignmentStatus),
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Result<Self, RecordQueryError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self::All),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(Self::All),
            Some(s) => s
                .parse()
                .map(Self::Only)
                .map_err(|_| RecordQueryError::InvalidStatus(s.to_string())),
        }
    }

    fn as_bind(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordPage {
    pub items: Vec<AssignmentRecord>,
    pub pagination: PaginationMeta,
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, params: ListRecordsParams) -> Result<RecordPage, RecordQueryError> {
    let filter = StatusFilter::parse(params.status.as_deref())?.as_bind();
    let paging = PaginationParams::new(params.page, params.per_page);

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM assignment_records WHERE $1::TEXT IS NULL OR status = $1",
    )
    .bind(filter)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, AssignmentRecord>(&format!(
        r#"{RECORD_SELECT}
        WHERE $1::TEXT IS NULL OR r.status = $1
        ORDER BY r.delivery_date DESC, r.id DESC
        LIMIT $2 OFFSET $3"#
    ))
    .bind(filter)
    .bind(paging.per_page())
    .bind(paging.offset())
    .fetch_all(pool)
    .await?;

    Ok(RecordPage {
        items,
        pagination: PaginationMeta::new(paging.page(), paging.per_page(), total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        assert_eq!(StatusFilter::parse(None).unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("All")).unwrap(), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse(Some("in use")).unwrap(),
            StatusFilter::Only(AssignmentStatus::InUse)
        );
        assert_eq!(
            StatusFilter::parse(Some("Returned")).unwrap().as_bind(),
            Some("Returned")
        );
        assert!(matches!(
            StatusFilter::parse(Some("Lost")),
            Err(RecordQueryError::InvalidStatus(_))
        ));
    }
}
