use sqlx::PgPool;

use super::EmployeeQueryError;
use crate::features::employees::models::{Employee, EMPLOYEE_COLUMNS};

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool) -> Result<Vec<Employee>, EmployeeQueryError> {
    let employees = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(employees)
}
