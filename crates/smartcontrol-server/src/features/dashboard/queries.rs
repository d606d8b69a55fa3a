//! Aggregates behind `GET /dashboard/stats`

use serde::Serialize;
use smartcontrol_common::types::{AssignmentStatus, DeviceCondition};
use sqlx::PgPool;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_devices: i64,
    pub in_use_devices: i64,
    pub maintenance_devices: i64,
    pub total_employees: i64,
    pub devices_by_condition: Vec<ConditionCount>,
    pub device_status_summary: StatusSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ConditionCount {
    pub condition: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub in_use: i64,
    pub available: i64,
    pub unavailable: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct Totals {
    total_devices: i64,
    in_use_devices: i64,
    maintenance_devices: i64,
    available_devices: i64,
    unavailable_devices: i64,
    total_employees: i64,
}

fn condition_names(filter: impl Fn(&DeviceCondition) -> bool) -> Vec<&'static str> {
    DeviceCondition::ALL
        .iter()
        .filter(|c| filter(c))
        .map(DeviceCondition::as_str)
        .collect()
}

#[tracing::instrument(skip(pool))]
pub async fn stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
    let totals = sqlx::query_as::<_, Totals>(
        r#"
        WITH device_state AS (
            SELECT d.condition,
                   EXISTS (
                       SELECT 1 FROM assignment_records r
                       WHERE r.device_id = d.id AND r.status = $1
                   ) AS in_use
            FROM devices d
        )
        SELECT
            (SELECT COUNT(*) FROM device_state) AS total_devices,
            (SELECT COUNT(*) FROM device_state WHERE in_use) AS in_use_devices,
            (SELECT COUNT(*) FROM device_state WHERE condition = $2) AS maintenance_devices,
            (SELECT COUNT(*) FROM device_state WHERE NOT in_use AND condition = ANY($3))
                AS available_devices,
            (SELECT COUNT(*) FROM device_state WHERE NOT in_use AND condition = ANY($4))
                AS unavailable_devices,
            (SELECT COUNT(*) FROM employees) AS total_employees
        "#,
    )
    .bind(AssignmentStatus::InUse.as_str())
    .bind(DeviceCondition::InMaintenance.as_str())
    .bind(condition_names(DeviceCondition::is_assignable))
    .bind(condition_names(DeviceCondition::is_unavailable))
    .fetch_one(pool)
    .await?;

    let devices_by_condition = sqlx::query_as::<_, ConditionCount>(
        "SELECT condition, COUNT(*) AS count FROM devices GROUP BY condition ORDER BY condition",
    )
    .fetch_all(pool)
    .await?;

    Ok(DashboardStats {
        total_devices: totals.total_devices,
        in_use_devices: totals.in_use_devices,
        maintenance_devices: totals.maintenance_devices,
        total_employees: totals.total_employees,
        devices_by_condition,
        device_status_summary: StatusSummary {
            in_use: totals.in_use_devices,
            available: totals.available_devices,
            unavailable: totals.unavailable_devices,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_partitions() {
        let assignable = condition_names(DeviceCondition::is_assignable);
        let unavailable = condition_names(DeviceCondition::is_unavailable);
        assert_eq!(assignable, vec!["New", "Approved for use"]);
        assert_eq!(assignable.len() + unavailable.len(), DeviceCondition::ALL.len());
        assert!(unavailable.contains(&"Loss reported"));
    }

    #[test]
    fn test_zeroed_stats_shape() {
        let body = serde_json::to_value(DashboardStats::default()).unwrap();
        assert_eq!(body["totalDevices"], 0);
        assert_eq!(body["deviceStatusSummary"]["unavailable"], 0);
        assert!(body["devicesByCondition"].as_array().unwrap().is_empty());
    }
}
