//! Repository for the `calendar_events` table.

use sqlx::PgPool;
use taskhive_core::types::{DbId, Timestamp};

use crate::models::calendar_event::{CalendarEvent, CreateCalendarEvent, UpdateCalendarEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, starts_at, ends_at, is_all_day, task_id, \
                       created_by, assigned_users, is_private, is_completed, labels, \
                       image_id, color, created_at, updated_at";

/// Provides CRUD operations for calendar events.
pub struct CalendarEventRepo;

impl CalendarEventRepo {
    /// Insert a new event created by `created_by`. Events start incomplete.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateCalendarEvent,
    ) -> Result<CalendarEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO calendar_events (title, description, starts_at, ends_at, is_all_day,
                                          task_id, created_by, assigned_users, is_private,
                                          labels, image_id, color)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_all_day)
            .bind(input.task_id)
            .bind(created_by)
            .bind(input.assigned_users.clone().unwrap_or_default())
            .bind(input.is_private)
            .bind(input.labels.clone().unwrap_or_default())
            .bind(input.image_id)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Find an event by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CalendarEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM calendar_events WHERE id = $1");
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List events whose start falls inside `[from, to]` inclusive, using
    /// the start-time index. Privacy and label filtering happen in the
    /// handler after this bulk fetch.
    pub async fn list_starting_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_events
             WHERE starts_at >= $1 AND starts_at <= $2
             ORDER BY starts_at, id"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// List all events. Used by label collation, which filters for
    /// visibility in application code.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM calendar_events ORDER BY id");
        sqlx::query_as::<_, CalendarEvent>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCalendarEvent,
    ) -> Result<Option<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                ends_at = COALESCE($5, ends_at),
                is_all_day = COALESCE($6, is_all_day),
                assigned_users = COALESCE($7, assigned_users),
                is_private = COALESCE($8, is_private),
                is_completed = COALESCE($9, is_completed),
                labels = COALESCE($10, labels),
                image_id = COALESCE($11, image_id),
                color = COALESCE($12, color)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_all_day)
            .bind(input.assigned_users.clone())
            .bind(input.is_private)
            .bind(input.is_completed)
            .bind(input.labels.clone())
            .bind(input.image_id)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
