//! Stored binary object metadata.

use serde::Serialize;
use sqlx::FromRow;
use taskhive_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// A row from the `stored_objects` table. The bytes themselves live on disk
/// under the upload directory, keyed by `storage_key`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredObject {
    pub id: DbId,
    pub storage_key: Uuid,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for recording a completed upload.
pub struct CreateStoredObject {
    pub storage_key: Uuid,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub uploaded_by: Option<DbId>,
}
