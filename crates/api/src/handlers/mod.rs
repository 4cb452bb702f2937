//! Request handlers, one module per resource.
//!
//! Every handler follows the same contract: authenticate (via the
//! [`AuthUser`](crate::middleware::auth::AuthUser) extractor), authorize
//! against the project relationship, validate references, perform the
//! operation, and -- for assignment-affecting mutations -- publish a
//! domain event for the notification router.

pub mod auth;
pub mod calendar;
pub mod category;
pub mod comment;
pub mod notification;
pub mod project;
pub mod task;
pub mod upload;
pub mod user;

use sqlx::PgPool;
use taskhive_core::error::CoreError;
use taskhive_core::types::DbId;
use taskhive_db::models::project::Project;
use taskhive_db::models::task::Task;
use taskhive_db::repositories::{ProjectRepo, TaskRepo};

use crate::error::{AppError, AppResult};

/// Load a project and verify the user is its owner or a team member.
///
/// Shared by every project-scoped handler (categories, tasks, comments).
pub(crate) async fn ensure_project_member(
    pool: &PgPool,
    project_id: DbId,
    user_id: DbId,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    if !project.is_member(user_id) {
        return Err(AppError::Core(CoreError::Forbidden("Access denied".into())));
    }

    Ok(project)
}

/// Load a task and verify the user belongs to its project.
///
/// Returns the task together with its project for handlers that need both.
pub(crate) async fn ensure_task_access(
    pool: &PgPool,
    task_id: DbId,
    user_id: DbId,
) -> AppResult<(Task, Project)> {
    let task = TaskRepo::find_by_id(pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    let project = ensure_project_member(pool, task.project_id, user_id).await?;
    Ok((task, project))
}
