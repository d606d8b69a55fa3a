pub mod create;
pub mod delete;
pub mod import;
pub mod update;

pub use create::{CreateDeviceCommand, CreateDeviceError};
pub use delete::{DeleteDeviceError, DeleteDeviceResponse};
pub use import::ImportDevicesError;
pub use update::{UpdateDeviceCommand, UpdateDeviceError};
