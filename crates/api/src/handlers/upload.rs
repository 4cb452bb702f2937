//! Handlers for binary uploads and file serving.
//!
//! The flow mirrors a presigned-URL object store: the client requests a
//! one-time upload URL, PUTs the file bytes to it, and receives an opaque
//! stored-object id to reference from tasks and calendar events. Bytes
//! live on disk under the configured upload directory, keyed by UUID;
//! metadata lives in the `stored_objects` table.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use taskhive_core::error::CoreError;
use taskhive_core::types::DbId;
use taskhive_core::upload::{issue_upload_token, verify_upload_token};
use taskhive_db::models::stored_object::CreateStoredObject;
use taskhive_db::repositories::StoredObjectRepo;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// The servable URL for a stored object id.
pub(crate) fn file_url(id: DbId) -> String {
    format!("/api/v1/files/{id}")
}

/// Response body for `POST /uploads/url`.
#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
}

/// Response body for `PUT /uploads/{token}`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: DbId,
    pub url: String,
}

/// POST /api/v1/uploads/url
///
/// Issue a one-time, expiring upload URL. No server-side state is created
/// until the bytes arrive.
pub async fn issue_upload_url(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UploadUrlResponse>> {
    let _ = auth; // any authenticated user may upload

    let token = issue_upload_token(
        state.config.jwt.secret.as_bytes(),
        state.config.upload_token_ttl_secs,
        chrono::Utc::now(),
    );

    Ok(Json(UploadUrlResponse {
        upload_url: format!("/api/v1/uploads/{token}"),
    }))
}

/// PUT /api/v1/uploads/{token}
///
/// Accept the file bytes for a previously issued upload URL. The token is
/// single-use: the storage key's unique constraint rejects replays.
pub async fn receive_upload(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let parsed = verify_upload_token(
        &token,
        state.config.jwt.secret.as_bytes(),
        chrono::Utc::now(),
    )?;

    if StoredObjectRepo::key_exists(&state.pool, parsed.storage_key).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Upload URL has already been used".into(),
        )));
    }

    if body.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Upload body is empty".into(),
        )));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    write_object(&state, parsed.storage_key, &body).await?;

    let object = StoredObjectRepo::create(
        &state.pool,
        &CreateStoredObject {
            storage_key: parsed.storage_key,
            content_type,
            size_bytes: body.len() as i64,
            uploaded_by: Some(auth.user_id),
        },
    )
    .await?;

    tracing::info!(
        object_id = object.id,
        size_bytes = object.size_bytes,
        user_id = auth.user_id,
        "File uploaded",
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: object.id,
            url: file_url(object.id),
        }),
    ))
}

/// GET /api/v1/files/{id}
///
/// Serve a stored object's bytes. Unauthenticated so image URLs work in
/// plain `<img>` tags; the id is the capability.
pub async fn serve_file(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let object = StoredObjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StoredObject",
            id,
        }))?;

    let path = object_path(&state, object.storage_key);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(object_id = id, error = %e, "Stored object missing from disk");
        AppError::Core(CoreError::NotFound {
            entity: "StoredObject",
            id,
        })
    })?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(([(CONTENT_TYPE, content_type)], bytes).into_response())
}

// ---------------------------------------------------------------------------
// Disk layout
// ---------------------------------------------------------------------------

fn object_path(state: &AppState, storage_key: Uuid) -> std::path::PathBuf {
    state
        .config
        .upload_dir
        .join(storage_key.simple().to_string())
}

async fn write_object(state: &AppState, storage_key: Uuid, bytes: &[u8]) -> AppResult<()> {
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {e}")))?;

    let path = object_path(state, storage_key);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to persist upload: {e}")))?;

    Ok(())
}
