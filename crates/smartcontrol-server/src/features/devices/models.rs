use chrono::{DateTime, Utc};
use serde::Serialize;
use smartcontrol_common::types::{DeviceCondition, DeviceStatus};
use smartcontrol_common::CommonError;
use sqlx::PgExecutor;

/// Device columns plus the linked line number and the in-use flag
pub(crate) const DEVICE_SELECT: &str = r#"
    SELECT d.id, d.model, d.imei1, d.imei2, d.condition, d.notes, d.line_id,
           l.number AS line_number,
           EXISTS (
               SELECT 1 FROM assignment_records r
               WHERE r.device_id = d.id AND r.status = 'In use'
           ) AS in_use,
           d.created_at
    FROM devices d
    LEFT JOIN lines l ON l.id = d.line_id
"#;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceRow {
    pub id: i64,
    pub model: String,
    pub imei1: String,
    pub imei2: Option<String>,
    pub condition: String,
    pub notes: Option<String>,
    pub line_id: Option<i64>,
    pub line_number: Option<String>,
    pub in_use: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub model: String,
    pub imei1: String,
    pub imei2: Option<String>,
    pub condition: DeviceCondition,
    pub notes: Option<String>,
    pub line_id: Option<i64>,
    pub current_line: Option<String>,
    pub status: DeviceStatus,
    pub created_at: DateTime<Utc>,
}

impl Device {
    pub fn is_eligible_for_maintenance(&self) -> bool {
        self.condition.is_eligible_for_maintenance() && self.status != DeviceStatus::InUse
    }
}

impl TryFrom<DeviceRow> for Device {
    type Error = CommonError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let condition: DeviceCondition = row.condition.parse()?;
        Ok(Self {
            id: row.id,
            model: row.model,
            imei1: row.imei1,
            imei2: row.imei2,
            condition,
            notes: row.notes,
            line_id: row.line_id,
            current_line: row.line_number,
            status: DeviceStatus::derive(condition, row.in_use),
            created_at: row.created_at,
        })
    }
}

pub(crate) async fn find_by_imei<'e, E>(executor: E, imei: &str) -> Result<Option<DeviceRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, DeviceRow>(&format!("{DEVICE_SELECT} WHERE d.imei1 = $1"))
        .bind(imei)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<DeviceRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, DeviceRow>(&format!("{DEVICE_SELECT} WHERE d.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}
