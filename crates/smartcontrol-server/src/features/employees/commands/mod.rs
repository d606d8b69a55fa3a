pub mod create;
pub mod delete;
pub mod import;
pub mod update;

pub use create::{CreateEmployeeError, EmployeeCommand, NewEmployee};
pub use delete::DeleteEmployeeError;
pub use import::ImportEmployeesError;
pub use update::UpdateEmployeeError;
