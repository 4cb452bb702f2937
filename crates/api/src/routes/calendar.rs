//! Route definitions for the `/calendar` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{calendar, upload};
use crate::state::AppState;

/// Routes mounted at `/calendar`.
///
/// ```text
/// GET    /events       -> list_events
/// POST   /events       -> create
/// PUT    /events/{id}  -> update
/// DELETE /events/{id}  -> delete
/// GET    /labels       -> get_labels
/// POST   /upload-url   -> issue_upload_url
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(calendar::list_events).post(calendar::create))
        .route(
            "/events/{id}",
            put(calendar::update).delete(calendar::delete),
        )
        .route("/labels", get(calendar::get_labels))
        .route("/upload-url", post(upload::issue_upload_url))
}
