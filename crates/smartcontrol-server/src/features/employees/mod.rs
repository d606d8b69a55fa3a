//! Employee registry
//!
//! Employees are identified on the API by their numeric id and carry a
//! unique registration number assigned by HR.

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateEmployeeError, DeleteEmployeeError, EmployeeCommand, ImportEmployeesError,
    UpdateEmployeeError,
};
pub use models::Employee;
pub use queries::{EmployeeAssignment, EmployeeQueryError};
pub use routes::employees_routes;
