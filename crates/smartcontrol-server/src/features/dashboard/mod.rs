//! Dashboard counters

pub mod queries;
pub mod routes;

pub use queries::{ConditionCount, DashboardStats, StatusSummary};
pub use routes::dashboard_routes;
