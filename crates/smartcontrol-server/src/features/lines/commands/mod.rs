pub mod create;
pub mod delete;
pub mod import;
pub mod update;

pub use create::{CreateLineError, LineCommand, NewLine};
pub use delete::DeleteLineError;
pub use import::ImportLinesError;
pub use update::UpdateLineError;
