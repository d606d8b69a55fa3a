//! Term documents and police reports
//!
//! Files land in the configured upload directory and are served back
//! under `/uploads`.

pub mod routes;
pub mod storage;

pub use routes::upload_routes;
pub use storage::{StoredFile, UploadFileError, ALLOWED_EXTENSIONS};
