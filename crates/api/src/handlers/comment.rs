//! Handlers for the `/comments` resource.
//!
//! Comments live on tasks and support one level of reply nesting. Any team
//! member may comment; editing and deleting are author-only. Creating a
//! comment notifies the task's assignment set via the deferred pipeline.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use taskhive_core::assign::assignment_recipients;
use taskhive_core::error::CoreError;
use taskhive_core::types::DbId;
use taskhive_db::models::comment::{Comment, CreateComment, UpdateComment};
use taskhive_db::models::user::UserSummary;
use taskhive_db::repositories::{CommentRepo, UserRepo};
use taskhive_events::{DomainEvent, EventKind};

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_task_access;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A reply with its author resolved.
#[derive(Debug, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserSummary>,
}

/// A top-level comment with author and replies resolved.
#[derive(Debug, Serialize)]
pub struct CommentDetail {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserSummary>,
    pub replies: Vec<CommentWithAuthor>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks/{task_id}/comments
///
/// List a task's top-level comments in creation order, each with its
/// author and replies.
pub async fn list_by_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<Json<Vec<CommentDetail>>> {
    ensure_task_access(&state.pool, task_id, auth.user_id).await?;

    let top_level = CommentRepo::list_top_level_by_task(&state.pool, task_id).await?;
    let replies = CommentRepo::list_replies_by_task(&state.pool, task_id).await?;

    // Resolve every author in one fetch.
    let mut author_ids: Vec<DbId> = top_level
        .iter()
        .chain(replies.iter())
        .map(|c| c.author_id)
        .collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors: HashMap<DbId, UserSummary> =
        UserRepo::find_summaries_by_ids(&state.pool, &author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

    // Group replies under their parents, preserving creation order.
    let mut replies_by_parent: HashMap<DbId, Vec<CommentWithAuthor>> = HashMap::new();
    for reply in replies {
        let author = authors.get(&reply.author_id).cloned();
        if let Some(parent) = reply.parent_comment_id {
            replies_by_parent
                .entry(parent)
                .or_default()
                .push(CommentWithAuthor {
                    comment: reply,
                    author,
                });
        }
    }

    let details = top_level
        .into_iter()
        .map(|comment| {
            let author = authors.get(&comment.author_id).cloned();
            let replies = replies_by_parent.remove(&comment.id).unwrap_or_default();
            CommentDetail {
                comment,
                author,
                replies,
            }
        })
        .collect();

    Ok(Json(details))
}

/// POST /api/v1/tasks/{task_id}/comments
///
/// Add a comment (or a reply to a top-level comment). The task's assignment
/// set, minus the author, is notified.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let (task, _project) = ensure_task_access(&state.pool, task_id, auth.user_id).await?;

    // Replies attach only to top-level comments of the same task.
    if let Some(parent_id) = input.parent_comment_id {
        let parent = CommentRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Comment",
                id: parent_id,
            }))?;
        if parent.task_id != task_id {
            return Err(AppError::Core(CoreError::Validation(
                "Parent comment belongs to a different task".into(),
            )));
        }
        if parent.parent_comment_id.is_some() {
            return Err(AppError::Core(CoreError::Validation(
                "Replies can only be added to top-level comments".into(),
            )));
        }
    }

    let comment = CommentRepo::create(&state.pool, task_id, auth.user_id, &input).await?;

    let recipients = assignment_recipients(&task.assigned_users, task.assignee_id, auth.user_id);
    if !recipients.is_empty() {
        state.event_bus.publish(
            DomainEvent::new(EventKind::CommentAdded, task_id, auth.user_id)
                .with_recipients(recipients),
        );
    }

    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/v1/comments/{id}
///
/// Edit a comment. Author-only, even for other team members.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComment>,
) -> AppResult<Json<Comment>> {
    let comment = find_comment(&state, id).await?;

    if comment.author_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only comment author can edit comment".into(),
        )));
    }

    let updated = CommentRepo::update_content(&state.pool, id, &input.content)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/comments/{id}
///
/// Delete a comment and its replies. Author-only.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state, id).await?;

    if comment.author_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only comment author can delete comment".into(),
        )));
    }

    CommentRepo::delete_with_replies(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_comment(state: &AppState, id: DbId) -> AppResult<Comment> {
    CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))
}
