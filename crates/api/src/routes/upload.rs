//! Route definitions for uploads and file serving.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::upload;
use crate::state::AppState;

/// Routes mounted at `/uploads` and `/files`.
///
/// ```text
/// POST /uploads/url      -> issue_upload_url
/// PUT  /uploads/{token}  -> receive_upload
/// GET  /files/{id}       -> serve_file (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploads/url", post(upload::issue_upload_url))
        .route("/uploads/{token}", put(upload::receive_upload))
        .route("/files/{id}", get(upload::serve_file))
}
