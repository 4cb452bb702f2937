//! Handlers for the `/tasks` resource.
//!
//! Tasks are project-scoped. List and detail responses are enriched in
//! handler code after bulk fetches: resolved assignee and member objects,
//! direct subtasks, and attachment descriptors. Assignment mutations
//! publish domain events that the notification router turns into
//! notifications -- fire and forget, never awaited here.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use taskhive_core::assign::{assignment_recipients, newly_assigned};
use taskhive_core::error::CoreError;
use taskhive_core::types::DbId;
use taskhive_db::models::project::Project;
use taskhive_db::models::task::{CreateTask, Task, UpdateTask, UpdateTaskOrder};
use taskhive_db::models::user::UserSummary;
use taskhive_db::repositories::{CategoryRepo, ProjectRepo, StoredObjectRepo, TaskRepo, UserRepo};
use taskhive_events::{DomainEvent, EventKind};

use crate::error::{AppError, AppResult};
use crate::handlers::upload::file_url;
use crate::handlers::{ensure_project_member, ensure_task_access};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// An attachment descriptor: the stored object id plus a servable URL.
/// Dangling image references (object rows since removed) are dropped.
#[derive(Debug, Serialize)]
pub struct ImageRef {
    pub id: DbId,
    pub url: String,
}

/// A task enriched for board and detail views.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    /// Resolved primary assignee, if any.
    pub assignee: Option<UserSummary>,
    /// Resolved `assigned_users`; unresolvable ids are dropped.
    pub members: Vec<UserSummary>,
    /// Direct subtasks, unenriched.
    pub subtasks: Vec<Task>,
    pub attachments: Vec<ImageRef>,
}

/// A task on the personal dashboard, enriched with its parent project.
#[derive(Debug, Serialize)]
pub struct PersonalTask {
    #[serde(flatten)]
    pub task: Task,
    pub project: Option<Project>,
    pub attachments: Vec<ImageRef>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{project_id}/tasks
///
/// List a project's top-level tasks in board order, each enriched with
/// assignee, members, subtasks, and attachments.
pub async fn list_by_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<TaskDetail>>> {
    ensure_project_member(&state.pool, project_id, auth.user_id).await?;

    let all = TaskRepo::list_by_project(&state.pool, project_id).await?;

    // Split into top-level tasks and a per-parent subtask map. Order within
    // both is preserved from the sorted bulk fetch.
    let mut top_level = Vec::new();
    let mut subtasks_by_parent: HashMap<DbId, Vec<Task>> = HashMap::new();
    for task in all {
        match task.parent_task_id {
            Some(parent) => subtasks_by_parent.entry(parent).or_default().push(task),
            None => top_level.push(task),
        }
    }

    let users = load_user_map(&state, &top_level).await?;
    let known_images = load_known_images(&state, &top_level).await?;

    let details = top_level
        .into_iter()
        .map(|task| {
            let subtasks = subtasks_by_parent.remove(&task.id).unwrap_or_default();
            enrich_task(task, subtasks, &users, &known_images)
        })
        .collect();

    Ok(Json(details))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskDetail>> {
    let (task, _project) = ensure_task_access(&state.pool, id, auth.user_id).await?;

    let subtasks = TaskRepo::list_by_parent(&state.pool, task.id).await?;
    let single = std::slice::from_ref(&task);
    let users = load_user_map(&state, single).await?;
    let known_images = load_known_images(&state, single).await?;

    Ok(Json(enrich_task(task, subtasks, &users, &known_images)))
}

/// GET /api/v1/tasks/personal
///
/// Tasks assigned to the caller across all projects: primary assignments
/// plus `assigned_users` memberships, without duplicates when both apply
/// to the same task.
pub async fn personal(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PersonalTask>>> {
    let mut tasks = TaskRepo::list_for_assignee(&state.pool, auth.user_id).await?;
    tasks.extend(TaskRepo::list_assigned_not_primary(&state.pool, auth.user_id).await?);

    let known_images = load_known_images(&state, &tasks).await?;

    let mut result = Vec::with_capacity(tasks.len());
    for task in tasks {
        let project = ProjectRepo::find_by_id(&state.pool, task.project_id).await?;
        let attachments = image_refs(&task.images, &known_images);
        result.push(PersonalTask {
            task,
            project,
            attachments,
        });
    }

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{project_id}/tasks
///
/// Create a task. New tasks start in `todo` with sort order project-max
/// plus one. Assigned users (and the primary assignee) other than the
/// caller are notified via the deferred pipeline.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    ensure_project_member(&state.pool, project_id, auth.user_id).await?;

    validate_category_ref(&state, project_id, input.category_id).await?;
    validate_parent_ref(&state, project_id, input.parent_task_id).await?;
    validate_user_refs(
        &state,
        input.assigned_users.as_deref().unwrap_or_default(),
        input.assignee_id,
    )
    .await?;

    let task = TaskRepo::create(&state.pool, project_id, auth.user_id, &input).await?;

    let recipients = assignment_recipients(&task.assigned_users, task.assignee_id, auth.user_id);
    if !recipients.is_empty() {
        state.event_bus.publish(
            DomainEvent::new(EventKind::TaskAssigned, task.id, auth.user_id)
                .with_recipients(recipients),
        );
    }

    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/v1/tasks/{id}
///
/// Partial patch: omitted fields are left unchanged. When the assignment
/// set changes, only users NEW to the set are notified -- users who merely
/// remain assigned receive nothing.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    let (old, _project) = ensure_task_access(&state.pool, id, auth.user_id).await?;

    validate_category_ref(&state, old.project_id, input.category_id).await?;
    validate_user_refs(
        &state,
        input.assigned_users.as_deref().unwrap_or_default(),
        input.assignee_id,
    )
    .await?;

    let updated = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    let added = newly_assigned(
        &old.assigned_users,
        old.assignee_id,
        &updated.assigned_users,
        updated.assignee_id,
        auth.user_id,
    );
    if !added.is_empty() {
        state.event_bus.publish(
            DomainEvent::new(EventKind::TaskUpdated, updated.id, auth.user_id)
                .with_recipients(added),
        );
    }

    Ok(Json(updated))
}

/// PUT /api/v1/tasks/{id}/order
///
/// Overwrite the task's board position. The category is overwritten with
/// whatever the client sent -- omitting it moves the task to
/// "uncategorized". No renormalization of siblings is performed.
pub async fn update_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTaskOrder>,
) -> AppResult<Json<Task>> {
    let (task, _project) = ensure_task_access(&state.pool, id, auth.user_id).await?;

    validate_category_ref(&state, task.project_id, input.category_id).await?;

    let updated = TaskRepo::update_order(&state.pool, id, input.sort_order, input.category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/tasks/{id}
///
/// Delete a task together with its subtask tree and the comments of every
/// deleted task.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_task_access(&state.pool, id, auth.user_id).await?;

    let (tasks, comments) = TaskRepo::delete_cascade(&state.pool, id).await?;
    tracing::debug!(task_id = id, tasks, comments, "Task deleted with dependents");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reference validation
// ---------------------------------------------------------------------------

/// A supplied category must exist and belong to the task's project.
async fn validate_category_ref(
    state: &AppState,
    project_id: DbId,
    category_id: Option<DbId>,
) -> AppResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    let category = CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;
    if category.project_id != project_id {
        return Err(AppError::Core(CoreError::Validation(
            "Category belongs to a different project".into(),
        )));
    }
    Ok(())
}

/// A supplied parent task must exist and belong to the same project.
async fn validate_parent_ref(
    state: &AppState,
    project_id: DbId,
    parent_task_id: Option<DbId>,
) -> AppResult<()> {
    let Some(parent_id) = parent_task_id else {
        return Ok(());
    };
    let parent = TaskRepo::find_by_id(&state.pool, parent_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: parent_id,
        }))?;
    if parent.project_id != project_id {
        return Err(AppError::Core(CoreError::Validation(
            "Parent task belongs to a different project".into(),
        )));
    }
    Ok(())
}

/// Every referenced user must exist.
async fn validate_user_refs(
    state: &AppState,
    assigned_users: &[DbId],
    assignee_id: Option<DbId>,
) -> AppResult<()> {
    let mut ids: Vec<DbId> = assigned_users.to_vec();
    if let Some(assignee) = assignee_id {
        ids.push(assignee);
    }
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let found = UserRepo::find_summaries_by_ids(&state.pool, &ids).await?;
    if found.len() != ids.len() {
        return Err(AppError::Core(CoreError::Validation(
            "Assignment references an unknown user".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Enrichment helpers
// ---------------------------------------------------------------------------

/// Bulk-fetch summaries for every user referenced by the given tasks.
async fn load_user_map(
    state: &AppState,
    tasks: &[Task],
) -> AppResult<HashMap<DbId, UserSummary>> {
    let mut ids: Vec<DbId> = Vec::new();
    for task in tasks {
        ids.extend(task.assignee_id);
        ids.extend(task.assigned_users.iter().copied());
    }
    ids.sort_unstable();
    ids.dedup();

    let summaries = UserRepo::find_summaries_by_ids(&state.pool, &ids).await?;
    Ok(summaries.into_iter().map(|u| (u.id, u)).collect())
}

/// Bulk-fetch the set of image ids that still resolve to stored objects.
async fn load_known_images(state: &AppState, tasks: &[Task]) -> AppResult<HashSet<DbId>> {
    let mut ids: Vec<DbId> = tasks.iter().flat_map(|t| t.images.iter().copied()).collect();
    ids.sort_unstable();
    ids.dedup();

    let objects = StoredObjectRepo::find_by_ids(&state.pool, &ids).await?;
    Ok(objects.into_iter().map(|o| o.id).collect())
}

/// Attachment descriptors for the image ids that still resolve.
fn image_refs(images: &[DbId], known: &HashSet<DbId>) -> Vec<ImageRef> {
    images
        .iter()
        .filter(|id| known.contains(id))
        .map(|&id| ImageRef {
            id,
            url: file_url(id),
        })
        .collect()
}

fn enrich_task(
    task: Task,
    subtasks: Vec<Task>,
    users: &HashMap<DbId, UserSummary>,
    known_images: &HashSet<DbId>,
) -> TaskDetail {
    let assignee = task.assignee_id.and_then(|id| users.get(&id).cloned());
    let members = task
        .assigned_users
        .iter()
        .filter_map(|id| users.get(id).cloned())
        .collect();
    let attachments = image_refs(&task.images, known_images);

    TaskDetail {
        task,
        assignee,
        members,
        subtasks,
        attachments,
    }
}
