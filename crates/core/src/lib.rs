//! Domain core for the JalSuraksha water-sample assessment service.
//!
//! Pure types and rules with no I/O: the ward registry, photo encoding,
//! the classification and digest prompts with their schemas, the response
//! validators, report lifecycle rules, alerts, and ward aggregation.

pub mod alert;
pub mod assessment;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod prompt;
pub mod report;
pub mod roles;
pub mod status;
pub mod summary;
pub mod threshold_validation;
pub mod types;
pub mod ward;
