//! Shared response envelope types for API handlers.
//!
//! Catalogue and lookup responses use a `{ "data": ... }` envelope. The
//! transform endpoint returns its payload unwrapped, matching the shape
//! existing clients already consume.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
