//! Handlers for the `/projects` resource.
//!
//! Reads are open to the owner and team members; renaming and member
//! management are owner-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use taskhive_core::color::validate_color;
use taskhive_core::error::CoreError;
use taskhive_core::types::DbId;
use taskhive_db::models::project::{CreateProject, Project, UpdateProject};
use taskhive_db::repositories::{ProjectRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_project_member;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /projects/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: DbId,
}

/// GET /api/v1/projects
///
/// List projects where the caller is the owner or a team member.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = ensure_project_member(&state.pool, id, auth.user_id).await?;
    Ok(Json(project))
}

/// POST /api/v1/projects
///
/// Create a project owned by the caller. The caller becomes the sole team
/// member and the project starts active.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    validate_color(&input.color)?;

    let project = ProjectRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/v1/projects/{id}
///
/// Update a project. Only the owner may do this, even when the caller is a
/// team member.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    if project.owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only project owner can update project".into(),
        )));
    }

    if let Some(ref color) = input.color {
        validate_color(color)?;
    }

    let updated = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(updated))
}

/// POST /api/v1/projects/{id}/members
///
/// Add a user to the team. Owner-only; adding an existing member is a
/// no-op.
pub async fn add_team_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    if project.owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only project owner can add team members".into(),
        )));
    }

    if !UserRepo::exists(&state.pool, input.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }));
    }

    let updated = ProjectRepo::add_team_member(&state.pool, id, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(updated))
}
