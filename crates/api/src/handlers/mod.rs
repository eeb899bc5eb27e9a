pub mod alerts;
pub mod assessment;
pub mod auth;
pub mod dashboard;
pub mod reports;
pub mod wards;
