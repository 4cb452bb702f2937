//! Route definitions for the `/projects` resource.
//!
//! Also nests category and task collection routes under
//! `/projects/{project_id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{category, project, task};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                            -> list
/// POST   /                            -> create
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// POST   /{id}/members                -> add_team_member
///
/// GET    /{project_id}/categories     -> list_by_project
/// POST   /{project_id}/categories     -> create
///
/// GET    /{project_id}/tasks          -> list_by_project
/// POST   /{project_id}/tasks          -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).put(project::update))
        .route("/{id}/members", post(project::add_team_member))
        .route(
            "/{project_id}/categories",
            get(category::list_by_project).post(category::create),
        )
        .route(
            "/{project_id}/tasks",
            get(task::list_by_project).post(task::create),
        )
}
