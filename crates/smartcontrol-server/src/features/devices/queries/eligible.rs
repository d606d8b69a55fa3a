//! Devices that can be sent to maintenance
//!
//! Defective or damaged devices that no employee currently holds.

use smartcontrol_common::types::DeviceCondition;
use sqlx::PgPool;

use super::DeviceQueryError;
use crate::features::devices::models::{Device, DeviceRow, DEVICE_SELECT};

pub fn eligible_conditions() -> Vec<String> {
    DeviceCondition::ALL
        .iter()
        .filter(|c| c.is_eligible_for_maintenance())
        .map(|c| c.as_str().to_string())
        .collect()
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<Vec<Device>, DeviceQueryError> {
    let sql = format!(
        r#"{DEVICE_SELECT}
        WHERE d.condition = ANY($1)
          AND NOT EXISTS (
              SELECT 1 FROM assignment_records r
              WHERE r.device_id = d.id AND r.status = 'In use'
          )
        ORDER BY d.model, d.id"#
    );
    let rows = sqlx::query_as::<_, DeviceRow>(&sql)
        .bind(eligible_conditions())
        .fetch_all(pool)
        .await?;

    let devices = rows
        .into_iter()
        .map(Device::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(devices)
}
