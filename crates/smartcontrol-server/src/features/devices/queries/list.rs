use sqlx::PgPool;

use super::DeviceQueryError;
use crate::features::devices::models::{Device, DeviceRow, DEVICE_SELECT};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<Vec<Device>, DeviceQueryError> {
    let rows = sqlx::query_as::<_, DeviceRow>(&format!("{DEVICE_SELECT} ORDER BY d.model, d.id"))
        .fetch_all(pool)
        .await?;

    let devices = rows
        .into_iter()
        .map(Device::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(devices)
}
