//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument.

pub mod alert_repo;
pub mod report_repo;

pub use alert_repo::AlertRepo;
pub use report_repo::ReportRepo;
