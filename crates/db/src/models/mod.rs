//! Record types and creation DTOs.

pub mod alert;
pub mod report;
