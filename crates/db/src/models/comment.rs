//! Task comment model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskhive_core::types::{DbId, Timestamp};

/// A comment row from the `comments` table.
///
/// `parent_comment_id` supports exactly one level of reply nesting: replies
/// always point at a top-level comment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub task_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub parent_comment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a comment. The task comes from the URL path and the
/// author from the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub content: String,
    pub parent_comment_id: Option<DbId>,
}

/// DTO for editing a comment's content.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateComment {
    pub content: String,
}
