//! Route definitions for the `/categories` resource.
//!
//! Collection routes (list, create) live under `/projects/{project_id}`.

use axum::routing::put;
use axum::Router;

use crate::handlers::category;
use crate::state::AppState;

/// Routes mounted at `/categories`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/categories/{id}",
        put(category::update).delete(category::delete),
    )
}
