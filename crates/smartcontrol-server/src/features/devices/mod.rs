//! Device inventory
//!
//! Devices are keyed by their first IMEI on the API. The status shown next
//! to each device is derived from its condition and whether an assignment
//! record currently holds it.

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateDeviceCommand, CreateDeviceError, DeleteDeviceError, DeleteDeviceResponse,
    ImportDevicesError, UpdateDeviceCommand, UpdateDeviceError,
};
pub use models::{Device, DeviceRow};
pub use queries::{DeviceHistory, DeviceQueryError, MaintenanceHistoryItem, UsageHistoryItem};
pub use routes::devices_routes;
