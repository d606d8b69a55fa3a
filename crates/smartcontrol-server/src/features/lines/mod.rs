//! SIM line registry

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateLineError, DeleteLineError, ImportLinesError, LineCommand, UpdateLineError,
};
pub use models::Line;
pub use queries::{LineQueryError, LineTermHistoryItem};
pub use routes::lines_routes;
