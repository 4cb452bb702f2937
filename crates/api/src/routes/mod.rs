pub mod auth;
pub mod calendar;
pub mod category;
pub mod comment;
pub mod health;
pub mod notification;
pub mod project;
pub mod task;
pub mod upload;
pub mod user;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                    notification push WebSocket
///
/// /auth/register                         register (public)
/// /auth/login                            login (public)
/// /auth/refresh                          refresh (public)
/// /auth/logout                           logout (requires auth)
///
/// /users                                 list users for pickers
///
/// /projects                              list, create
/// /projects/{id}                         get, update (owner only)
/// /projects/{id}/members                 add team member (owner only)
/// /projects/{project_id}/categories      list, create
/// /projects/{project_id}/tasks           list, create
///
/// /categories/{id}                       update, delete
///
/// /tasks/personal                        caller's assigned tasks
/// /tasks/upload-url                      one-time upload URL (POST)
/// /tasks/{id}                            get, update, delete
/// /tasks/{id}/order                      overwrite board position (PUT)
/// /tasks/{task_id}/comments              list, create
///
/// /comments/{id}                         update, delete (author only)
///
/// /calendar/events                       list (range + filters), create
/// /calendar/events/{id}                  update, delete (creator only)
/// /calendar/labels                       visible labels, sorted + deduped
/// /calendar/upload-url                   one-time upload URL (POST)
///
/// /notifications                         list (newest first)
/// /notifications/{id}/read               mark read (POST)
/// /notifications/read-all                mark all read (POST)
///
/// /uploads/url                           one-time upload URL (POST)
/// /uploads/{token}                       upload bytes (PUT)
/// /files/{id}                            serve stored object (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(user::router())
        .nest("/projects", project::router())
        .merge(category::router())
        .merge(task::router())
        .merge(comment::router())
        .nest("/calendar", calendar::router())
        .nest("/notifications", notification::router())
        .merge(upload::router())
        .route("/ws", get(ws::ws_handler))
}
