//! Handlers for the `/categories` resource.
//!
//! Categories are project-scoped; any team member may manage them.
//! Deleting a category moves its tasks to "uncategorized" instead of
//! deleting them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use taskhive_core::color::validate_color;
use taskhive_core::error::CoreError;
use taskhive_core::types::DbId;
use taskhive_db::models::category::{Category, CreateCategory, UpdateCategory};
use taskhive_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_project_member;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/categories
///
/// List a project's categories in board order.
pub async fn list_by_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Category>>> {
    ensure_project_member(&state.pool, project_id, auth.user_id).await?;

    let categories = CategoryRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(categories))
}

/// POST /api/v1/projects/{project_id}/categories
///
/// Create a category at the end of the project's ordering: the first
/// category gets sort order 0, each subsequent one sibling-max plus one.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    ensure_project_member(&state.pool, project_id, auth.user_id).await?;
    validate_color(&input.color)?;

    let category = CategoryRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    let category = find_category(&state, id).await?;
    ensure_project_member(&state.pool, category.project_id, auth.user_id).await?;

    if let Some(ref color) = input.color {
        validate_color(color)?;
    }

    let updated = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/categories/{id}
///
/// Delete a category. Its tasks survive with the category reference
/// cleared.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let category = find_category(&state, id).await?;
    ensure_project_member(&state.pool, category.project_id, auth.user_id).await?;

    CategoryRepo::delete_and_release_tasks(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_category(state: &AppState, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
}
