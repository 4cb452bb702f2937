//! Repository for the `stored_objects` table.

use sqlx::PgPool;
use taskhive_core::types::DbId;
use uuid::Uuid;

use crate::models::stored_object::{CreateStoredObject, StoredObject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, storage_key, content_type, size_bytes, uploaded_by, created_at";

/// Provides CRUD operations for stored object metadata.
pub struct StoredObjectRepo;

impl StoredObjectRepo {
    /// Record a completed upload, returning the created row.
    ///
    /// Fails with a unique-constraint violation if the storage key was
    /// already recorded -- the basis of one-time upload-token semantics.
    pub async fn create(
        pool: &PgPool,
        input: &CreateStoredObject,
    ) -> Result<StoredObject, sqlx::Error> {
        let query = format!(
            "INSERT INTO stored_objects (storage_key, content_type, size_bytes, uploaded_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredObject>(&query)
            .bind(input.storage_key)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// Find a stored object by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StoredObject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stored_objects WHERE id = $1");
        sqlx::query_as::<_, StoredObject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a storage key has already been used.
    pub async fn key_exists(pool: &PgPool, storage_key: Uuid) -> Result<bool, sqlx::Error> {
        let found: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM stored_objects WHERE storage_key = $1")
                .bind(storage_key)
                .fetch_optional(pool)
                .await?;
        Ok(found.is_some())
    }

    /// Bulk-fetch objects by id. Unknown ids are simply absent from the
    /// result, which lets callers drop dangling image references.
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<StoredObject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stored_objects WHERE id = ANY($1)");
        sqlx::query_as::<_, StoredObject>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
