//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the session from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any session.

pub mod auth;
pub mod rbac;
