//! Repository for the `tasks` table.

use sqlx::PgPool;
use taskhive_core::types::{DbId, Timestamp};

use crate::models::task::{CreateTask, Task, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, project_id, category_id, assignee_id, \
                       assigned_users, created_by, parent_task_id, status, priority, \
                       due_at, tags, images, sort_order, created_at, updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task at the end of the project's ordering.
    ///
    /// The sort order is one past the maximum across ALL of the project's
    /// tasks (subtasks included), or 0 for the project's first task.
    /// New tasks always start in `todo`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, project_id, category_id, assignee_id,
                                assigned_users, created_by, parent_task_id, priority, due_at,
                                tags, images, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                     COALESCE((SELECT MAX(sort_order) + 1 FROM tasks WHERE project_id = $3), 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(project_id)
            .bind(input.category_id)
            .bind(input.assignee_id)
            .bind(input.assigned_users.clone().unwrap_or_default())
            .bind(created_by)
            .bind(input.parent_task_id)
            .bind(input.priority)
            .bind(input.due_at)
            .bind(input.tags.clone().unwrap_or_default())
            .bind(input.images.clone().unwrap_or_default())
            .fetch_one(pool)
            .await
    }

    /// Find a task by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every task in a project (top-level and subtasks) in board order.
    ///
    /// Callers split the result into top-level tasks and a per-parent
    /// subtask map; joins happen in application code after this bulk fetch.
    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY sort_order, id");
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List the direct subtasks of a task in board order.
    pub async fn list_by_parent(pool: &PgPool, parent_task_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE parent_task_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(parent_task_id)
            .fetch_all(pool)
            .await
    }

    /// List tasks where the user is the primary assignee.
    pub async fn list_for_assignee(pool: &PgPool, user_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE assignee_id = $1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List tasks where the user appears in `assigned_users` without being
    /// the primary assignee. Together with [`Self::list_for_assignee`] this
    /// yields the personal task set without duplicates.
    pub async fn list_assigned_not_primary(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE $1 = ANY(assigned_users)
               AND (assignee_id IS NULL OR assignee_id <> $1)
             ORDER BY id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List incomplete tasks whose due date falls inside the window.
    pub async fn list_due_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE due_at IS NOT NULL
               AND due_at >= $1
               AND due_at <= $2
               AND status <> 'completed'
             ORDER BY due_at"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category_id = COALESCE($4, category_id),
                assignee_id = COALESCE($5, assignee_id),
                assigned_users = COALESCE($6, assigned_users),
                status = COALESCE($7, status),
                priority = COALESCE($8, priority),
                due_at = COALESCE($9, due_at),
                tags = COALESCE($10, tags),
                images = COALESCE($11, images)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(input.assignee_id)
            .bind(input.assigned_users.clone())
            .bind(input.status)
            .bind(input.priority)
            .bind(input.due_at)
            .bind(input.tags.clone())
            .bind(input.images.clone())
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a task's board position.
    ///
    /// The category is always overwritten with the supplied value -- an
    /// absent category moves the task to "uncategorized". No sibling
    /// renormalization is performed.
    pub async fn update_order(
        pool: &PgPool,
        id: DbId,
        sort_order: i32,
        category_id: Option<DbId>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET sort_order = $2, category_id = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(sort_order)
            .bind(category_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a task together with its whole subtask tree and the comments
    /// of every deleted task, in one transaction.
    ///
    /// Returns `(deleted_tasks, deleted_comments)`.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<(u64, u64), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let subtree: Vec<DbId> = sqlx::query_scalar(
            "WITH RECURSIVE subtree AS (
                 SELECT id FROM tasks WHERE id = $1
                 UNION ALL
                 SELECT t.id FROM tasks t JOIN subtree s ON t.parent_task_id = s.id
             )
             SELECT id FROM subtree",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let comments = sqlx::query("DELETE FROM comments WHERE task_id = ANY($1)")
            .bind(&subtree)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let tasks = sqlx::query("DELETE FROM tasks WHERE id = ANY($1)")
            .bind(&subtree)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok((tasks, comments))
    }
}
