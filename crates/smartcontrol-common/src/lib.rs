//! SmartControl Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Types and utilities shared by the SmartControl workspace members.
//!
//! - **Error Handling**: [`CommonError`] and the crate [`Result`] alias
//! - **Logging**: subscriber setup driven by [`logging::LogConfig`]
//! - **Types**: inventory vocabulary (device conditions, assignment and
//!   maintenance states) with their canonical string forms
//!
//! # Example
//!
//! ```no_run
//! use smartcontrol_common::types::DeviceCondition;
//!
//! let condition: DeviceCondition = "Defective".parse()?;
//! assert!(condition.is_eligible_for_maintenance());
//! # Ok::<(), smartcontrol_common::CommonError>(())
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{CommonError, Result};
