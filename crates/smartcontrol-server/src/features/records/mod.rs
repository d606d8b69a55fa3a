//! Device assignment records
//!
//! A record is the delivery term signed when an employee receives a device,
//! later completed with the return details. A device is in use while it has
//! a record with status `In use`.

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateRecordCommand, CreateRecordError, DeleteRecordError, UpdateRecordCommand,
    UpdateRecordError,
};
pub use models::AssignmentRecord;
pub use queries::{ListRecordsParams, RecordQueryError, StatusFilter};
pub use routes::records_routes;
