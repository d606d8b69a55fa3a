//! HTTP surface shared by every feature

pub mod response;

pub use response::{ApiResponse, ErrorResponse, PaginationMeta};
