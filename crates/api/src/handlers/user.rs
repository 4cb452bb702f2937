//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use taskhive_core::types::DbId;
use taskhive_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// A user entry for assignment pickers, with the display name already
/// resolved (name, falling back to email).
#[derive(Debug, Serialize)]
pub struct TeamMember {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// GET /api/v1/users
///
/// List all users. Any authenticated user may call this; the result feeds
/// member and assignee pickers.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<TeamMember>>> {
    let _ = auth; // authentication is the only requirement

    let users = UserRepo::list_summaries(&state.pool).await?;

    let members = users
        .into_iter()
        .map(|u| TeamMember {
            id: u.id,
            name: u.name.unwrap_or_else(|| u.email.clone()),
            email: u.email,
            avatar_url: u.avatar_url,
        })
        .collect();

    Ok(Json(members))
}
