use sqlx::PgPool;

use super::DeviceQueryError;
use crate::features::devices::models::{self, Device};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, imei: &str) -> Result<Device, DeviceQueryError> {
    let row = models::find_by_imei(pool, imei)
        .await?
        .ok_or_else(|| DeviceQueryError::NotFound(imei.to_string()))?;
    Ok(Device::try_from(row)?)
}
