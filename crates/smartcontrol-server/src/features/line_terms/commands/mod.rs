pub mod create;

pub use create::{CreateLineTermCommand, CreateLineTermError};
