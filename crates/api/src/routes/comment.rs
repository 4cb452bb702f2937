//! Route definitions for the `/comments` resource.
//!
//! Collection routes (list, create) live under `/tasks/{task_id}`.

use axum::routing::put;
use axum::Router;

use crate::handlers::comment;
use crate::state::AppState;

/// Routes mounted at `/comments`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/comments/{id}",
        put(comment::update).delete(comment::delete),
    )
}
