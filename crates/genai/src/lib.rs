//! Model backends for the water-sample cleanliness assessment.
//!
//! Every backend implements [`backend::AssessmentBackend`]. The
//! [`assessor::Assessor`] front door adds admission control, the per-attempt
//! timeout, the single transient retry, and a final schema check.

pub mod assessor;
pub mod backend;
pub mod config;
pub mod gemini;
pub mod mock;
pub mod remote;

pub use assessor::Assessor;
pub use backend::AssessmentBackend;
pub use config::{build_backend, AssessorConfig, BackendKind};
