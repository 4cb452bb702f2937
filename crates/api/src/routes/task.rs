//! Route definitions for the `/tasks` resource.
//!
//! Collection routes (list, create) live under `/projects/{project_id}`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{comment, task, upload};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /tasks/personal              -> personal
/// POST   /tasks/upload-url            -> issue_upload_url
/// GET    /tasks/{id}                  -> get_by_id
/// PUT    /tasks/{id}                  -> update
/// DELETE /tasks/{id}                  -> delete
/// PUT    /tasks/{id}/order            -> update_order
/// GET    /tasks/{task_id}/comments    -> list_by_task
/// POST   /tasks/{task_id}/comments    -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks/personal", get(task::personal))
        .route("/tasks/upload-url", post(upload::issue_upload_url))
        .route(
            "/tasks/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
        .route("/tasks/{id}/order", put(task::update_order))
        .route(
            "/tasks/{task_id}/comments",
            get(comment::list_by_task).post(comment::create),
        )
}
