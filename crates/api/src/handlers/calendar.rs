//! Handlers for the `/calendar` resource.
//!
//! Events are fetched by start-time range, then filtered in-process by
//! privacy, completion status, and label intersection -- three independent
//! filters. Responses are enriched with the creator, resolved members, the
//! linked task, and an image URL that falls back to the linked task's
//! first attachment.

use std::collections::{BTreeSet, HashMap};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use taskhive_core::color::validate_color;
use taskhive_core::error::CoreError;
use taskhive_core::types::{DbId, Timestamp};
use taskhive_db::models::calendar_event::{
    CalendarEvent, CreateCalendarEvent, UpdateCalendarEvent,
};
use taskhive_db::models::task::Task;
use taskhive_db::models::user::UserSummary;
use taskhive_db::repositories::{CalendarEventRepo, StoredObjectRepo, TaskRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::upload::file_url;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /calendar/events`.
#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    /// Inclusive lower bound on event start (RFC 3339).
    pub start: Timestamp,
    /// Inclusive upper bound on event start (RFC 3339).
    pub end: Timestamp,
    /// When `false`, completed events are excluded. Default is show-all.
    pub show_completed: Option<bool>,
    /// Comma-separated label filter. An event passes if any of its labels
    /// is in this set; empty/absent means no label filtering.
    pub labels: Option<String>,
}

/// An event enriched for calendar views.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: CalendarEvent,
    /// Resolved creator.
    pub creator: Option<UserSummary>,
    /// Resolved `assigned_users`; unresolvable ids are dropped.
    pub members: Vec<UserSummary>,
    /// The linked task, if any.
    pub task: Option<Task>,
    /// The event's own image, falling back to the linked task's first
    /// attachment when the event has none.
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/calendar/events
pub async fn list_events(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListEventsQuery>,
) -> AppResult<Json<Vec<EventDetail>>> {
    let label_filter: Vec<String> = params
        .labels
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let events =
        CalendarEventRepo::list_starting_between(&state.pool, params.start, params.end).await?;

    // Three independent filters: privacy, completion, label intersection.
    let visible: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|event| {
            if !event.visible_to(auth.user_id) {
                return false;
            }
            if params.show_completed == Some(false) && event.is_completed {
                return false;
            }
            if !label_filter.is_empty()
                && !event.labels.iter().any(|l| label_filter.contains(l))
            {
                return false;
            }
            true
        })
        .collect();

    let mut details = Vec::with_capacity(visible.len());
    for event in visible {
        details.push(enrich_event(&state, event).await?);
    }

    Ok(Json(details))
}

/// GET /api/v1/calendar/labels
///
/// All labels across events visible to the caller, deduplicated and
/// sorted lexicographically. No pagination; label vocabularies are small.
pub async fn get_labels(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<String>>> {
    let events = CalendarEventRepo::list_all(&state.pool).await?;

    let labels: BTreeSet<String> = events
        .into_iter()
        .filter(|event| event.visible_to(auth.user_id))
        .flat_map(|event| event.labels)
        .collect();

    Ok(Json(labels.into_iter().collect()))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/calendar/events
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCalendarEvent>,
) -> AppResult<(StatusCode, Json<CalendarEvent>)> {
    validate_color(&input.color)?;

    if let Some(task_id) = input.task_id {
        TaskRepo::find_by_id(&state.pool, task_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            }))?;
    }

    let event = CalendarEventRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/v1/calendar/events/{id}
///
/// Update an event. The creator or any assigned user may do this.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCalendarEvent>,
) -> AppResult<Json<CalendarEvent>> {
    let event = find_event(&state, id).await?;

    if !event.editable_by(auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden("Access denied".into())));
    }

    if let Some(ref color) = input.color {
        validate_color(color)?;
    }

    let updated = CalendarEventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CalendarEvent",
            id,
        }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/calendar/events/{id}
///
/// Delete an event. Creator-only -- assigned users may edit but not
/// delete.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let event = find_event(&state, id).await?;

    if event.created_by != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only event creator can delete event".into(),
        )));
    }

    CalendarEventRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_event(state: &AppState, id: DbId) -> AppResult<CalendarEvent> {
    CalendarEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CalendarEvent",
            id,
        }))
}

/// Resolve creator, members, linked task, and image URL for one event.
async fn enrich_event(state: &AppState, event: CalendarEvent) -> AppResult<EventDetail> {
    let mut user_ids = event.assigned_users.clone();
    user_ids.push(event.created_by);
    user_ids.sort_unstable();
    user_ids.dedup();
    let users: HashMap<DbId, UserSummary> =
        UserRepo::find_summaries_by_ids(&state.pool, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

    let creator = users.get(&event.created_by).cloned();
    let members = event
        .assigned_users
        .iter()
        .filter_map(|id| users.get(id).cloned())
        .collect();

    let task = match event.task_id {
        Some(task_id) => TaskRepo::find_by_id(&state.pool, task_id).await?,
        None => None,
    };

    let image_url = resolve_image_url(state, &event, task.as_ref()).await?;

    Ok(EventDetail {
        event,
        creator,
        members,
        task,
        image_url,
    })
}

/// The event's own image if it still resolves; otherwise the linked task's
/// first attachment, if that resolves.
async fn resolve_image_url(
    state: &AppState,
    event: &CalendarEvent,
    task: Option<&Task>,
) -> AppResult<Option<String>> {
    if let Some(image_id) = event.image_id {
        let found = StoredObjectRepo::find_by_id(&state.pool, image_id).await?;
        return Ok(found.map(|o| file_url(o.id)));
    }

    if let Some(&first) = task.and_then(|t| t.images.first()) {
        let found = StoredObjectRepo::find_by_id(&state.pool, first).await?;
        return Ok(found.map(|o| file_url(o.id)));
    }

    Ok(None)
}
