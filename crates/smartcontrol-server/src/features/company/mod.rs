//! The single company profile shown on reports

pub mod logo;
pub mod profile;
pub mod routes;

pub use logo::{Logo, LogoError};
pub use profile::{CompanyProfile, UpdateCompanyCommand, UpdateCompanyError};
pub use routes::company_routes;
