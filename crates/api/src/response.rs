//! Shared response envelope types for API handlers.
//!
//! Listing and record endpoints use a `{ "data": ... }` envelope. The
//! assessment contract endpoint answers with the bare result object.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
