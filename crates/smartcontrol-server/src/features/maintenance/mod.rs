//! Maintenance service orders
//!
//! Opening an order moves the device to `In maintenance`. Closing it may
//! set the condition the device came back in.

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateMaintenanceCommand, CreateMaintenanceError, DeleteMaintenanceError,
    UpdateMaintenanceCommand, UpdateMaintenanceError,
};
pub use models::MaintenanceOrder;
pub use queries::MaintenanceQueryError;
pub use routes::maintenance_routes;
