pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateRecordCommand, CreateRecordError};
pub use delete::DeleteRecordError;
pub use update::{UpdateRecordCommand, UpdateRecordError};
