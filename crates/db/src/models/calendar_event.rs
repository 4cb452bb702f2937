//! Calendar event model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskhive_core::types::{DbId, Timestamp};

/// A calendar event row from the `calendar_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarEvent {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_all_day: bool,
    pub task_id: Option<DbId>,
    pub created_by: DbId,
    pub assigned_users: Vec<DbId>,
    pub is_private: bool,
    pub is_completed: bool,
    pub labels: Vec<String>,
    pub image_id: Option<DbId>,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CalendarEvent {
    /// Privacy rule: public events are visible to everyone; private events
    /// only to their creator or assigned users.
    pub fn visible_to(&self, user_id: DbId) -> bool {
        !self.is_private || self.created_by == user_id || self.assigned_users.contains(&user_id)
    }

    /// Creator or any assigned user may edit the event.
    pub fn editable_by(&self, user_id: DbId) -> bool {
        self.created_by == user_id || self.assigned_users.contains(&user_id)
    }
}

/// DTO for creating a calendar event. The creator comes from the
/// authenticated caller; events start out not completed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCalendarEvent {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_all_day: bool,
    pub task_id: Option<DbId>,
    pub assigned_users: Option<Vec<DbId>>,
    pub is_private: bool,
    pub labels: Option<Vec<String>>,
    pub image_id: Option<DbId>,
    pub color: String,
}

/// DTO for updating a calendar event. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCalendarEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_all_day: Option<bool>,
    pub assigned_users: Option<Vec<DbId>>,
    pub is_private: Option<bool>,
    pub is_completed: Option<bool>,
    pub labels: Option<Vec<String>>,
    pub image_id: Option<DbId>,
    pub color: Option<String>,
}
