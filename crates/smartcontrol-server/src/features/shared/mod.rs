//! Helpers shared by the feature slices
//!
//! - **pagination**: page/per_page parameters
//! - **validation**: required and bounded text fields
//! - **db_errors**: constraint violation classification
//! - **import**: CSV bulk import plumbing
//! - **multipart**: reading uploaded files

pub mod db_errors;
pub mod import;
pub mod multipart;
pub mod pagination;
pub mod validation;

pub use db_errors::{constraint_violation, ConstraintViolation};
pub use pagination::PaginationParams;
pub use validation::{
    optional_choice, optional_text, required_choice, required_text, validate_email,
    ValidationError, MAX_TEXT_LENGTH,
};
