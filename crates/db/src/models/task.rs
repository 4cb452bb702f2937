//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskhive_core::types::{DbId, Timestamp};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A task row from the `tasks` table.
///
/// `parent_task_id` links subtasks to their parent; `assigned_users` is the
/// broader assignment set alongside the single primary `assignee_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub project_id: DbId,
    pub category_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub assigned_users: Vec<DbId>,
    pub created_by: DbId,
    pub parent_task_id: Option<DbId>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: Option<Timestamp>,
    pub tags: Vec<String>,
    pub images: Vec<DbId>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new task. Project and creator come from the request
/// context; status starts at `todo` and the sort order is assigned
/// project-max plus one.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub assigned_users: Option<Vec<DbId>>,
    pub parent_task_id: Option<DbId>,
    pub priority: TaskPriority,
    pub due_at: Option<Timestamp>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<DbId>>,
}

/// DTO for updating an existing task. All fields are optional; omitted
/// fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub assigned_users: Option<Vec<DbId>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_at: Option<Timestamp>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<DbId>>,
}

/// DTO for board reordering. The category is overwritten with whatever the
/// client sends -- an absent category moves the task to "uncategorized".
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskOrder {
    pub sort_order: i32,
    pub category_id: Option<DbId>,
}
