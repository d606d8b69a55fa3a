pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateMaintenanceCommand, CreateMaintenanceError};
pub use delete::DeleteMaintenanceError;
pub use update::{UpdateMaintenanceCommand, UpdateMaintenanceError};
