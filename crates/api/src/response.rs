//! Shared response envelope types for API handlers.
//!
//! Listing endpoints that page or count wrap their payload in a
//! `{ "data": ... }` envelope. Use [`DataResponse`] instead of ad-hoc
//! `serde_json::json!({ "data": ... })` for compile-time type safety.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
