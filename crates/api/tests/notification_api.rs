//! Integration tests for the notification pipeline: the events mutation
//! handlers publish, the router's inserts, the reminder scheduler, and the
//! read-state endpoints.
//!
//! Tests subscribe to the event bus directly and drive the router's
//! `route_event` by hand, so the deferred fan-out becomes deterministic.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    add_member, body_json, create_project, create_task, get, post_empty, put_json, register_user,
};
use sqlx::PgPool;
use taskhive_api::notifications::NotificationRouter;
use taskhive_events::EventKind;

#[sqlx::test(migrations = "../db/migrations")]
async fn task_creation_notifies_assignees_but_not_actor(pool: PgPool) {
    let state = common::test_state(pool);
    let app = common::app_with_state(state.clone());
    let mut events = state.event_bus.subscribe();

    let owner = register_user(&app, "owner@example.com").await;
    let helper = register_user(&app, "helper@example.com").await;
    let project_id = create_project(&app, &owner, "Notify").await;
    add_member(&app, &owner, project_id, helper.id).await;

    create_task(
        &app,
        &owner,
        project_id,
        serde_json::json!({ "title": "Urgent thing", "assignee_id": helper.id, "assigned_users": [owner.id, helper.id] }),
    )
    .await;

    let event = events.try_recv().expect("task creation publishes an event");
    assert_eq!(event.kind, EventKind::TaskAssigned);
    assert_eq!(event.actor_id, owner.id);
    // The actor is excluded; the assignee appears once despite being in
    // both assignment fields.
    assert_eq!(event.recipients, vec![helper.id]);

    // Drive the router by hand and observe the insert.
    let router = NotificationRouter::new(state.pool.clone(), Arc::clone(&state.ws_manager));
    router.route_event(&event).await.unwrap();

    let response = get(&app, "/api/v1/notifications", Some(&helper.token)).await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "task_assigned");
    assert_eq!(items[0]["is_read"], false);
    assert!(items[0]["message"]
        .as_str()
        .unwrap()
        .contains("Urgent thing"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reassignment_notifies_only_new_members(pool: PgPool) {
    let state = common::test_state(pool);
    let app = common::app_with_state(state.clone());
    let mut events = state.event_bus.subscribe();

    let owner = register_user(&app, "owner@example.com").await;
    let a = register_user(&app, "a@example.com").await;
    let b = register_user(&app, "b@example.com").await;
    let c = register_user(&app, "c@example.com").await;
    let project_id = create_project(&app, &owner, "Notify").await;
    for user in [&a, &b, &c] {
        add_member(&app, &owner, project_id, user.id).await;
    }

    let task = create_task(
        &app,
        &owner,
        project_id,
        serde_json::json!({ "title": "Shared", "assigned_users": [a.id, b.id] }),
    )
    .await;
    let _ = events.try_recv().expect("creation event");

    // {A, B} -> {A, B, C}: only C is notified.
    let response = put_json(
        &app,
        &format!("/api/v1/tasks/{}", task["id"]),
        Some(&owner.token),
        serde_json::json!({ "assigned_users": [a.id, b.id, c.id] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let event = events.try_recv().expect("reassignment publishes an event");
    assert_eq!(event.kind, EventKind::TaskUpdated);
    assert_eq!(event.recipients, vec![c.id]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unchanged_assignment_publishes_nothing(pool: PgPool) {
    let state = common::test_state(pool);
    let app = common::app_with_state(state.clone());
    let mut events = state.event_bus.subscribe();

    let owner = register_user(&app, "owner@example.com").await;
    let a = register_user(&app, "a@example.com").await;
    let project_id = create_project(&app, &owner, "Quiet").await;
    add_member(&app, &owner, project_id, a.id).await;

    let task = create_task(
        &app,
        &owner,
        project_id,
        serde_json::json!({ "assigned_users": [a.id] }),
    )
    .await;
    let _ = events.try_recv().expect("creation event");

    // Re-sending the same assignment set (plus a title change) renotifies
    // nobody.
    put_json(
        &app,
        &format!("/api/v1/tasks/{}", task["id"]),
        Some(&owner.token),
        serde_json::json!({ "title": "Renamed", "assigned_users": [a.id] }),
    )
    .await;

    assert!(events.try_recv().is_err(), "no event for unchanged set");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn comment_creation_notifies_assignment_set(pool: PgPool) {
    let state = common::test_state(pool);
    let app = common::app_with_state(state.clone());
    let mut events = state.event_bus.subscribe();

    let owner = register_user(&app, "owner@example.com").await;
    let a = register_user(&app, "a@example.com").await;
    let project_id = create_project(&app, &owner, "Comments").await;
    add_member(&app, &owner, project_id, a.id).await;

    let task = create_task(
        &app,
        &owner,
        project_id,
        serde_json::json!({ "assignee_id": a.id }),
    )
    .await;
    let _ = events.try_recv().expect("creation event");

    // The assignee comments: only the (other) assignment set is notified,
    // which here is nobody besides the author -- so no event at all.
    let response = common::post_json(
        &app,
        &format!("/api/v1/tasks/{}/comments", task["id"]),
        Some(&a.token),
        serde_json::json!({ "content": "on it" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(events.try_recv().is_err());

    // The owner comments: the assignee is notified.
    common::post_json(
        &app,
        &format!("/api/v1/tasks/{}/comments", task["id"]),
        Some(&owner.token),
        serde_json::json!({ "content": "status?" }),
    )
    .await;

    let event = events.try_recv().expect("comment event");
    assert_eq!(event.kind, EventKind::CommentAdded);
    assert_eq!(event.recipients, vec![a.id]);

    let router = NotificationRouter::new(state.pool.clone(), Arc::clone(&state.ws_manager));
    router.route_event(&event).await.unwrap();

    let response = get(&app, "/api/v1/notifications", Some(&a.token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["kind"], "comment_added");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn router_absorbs_events_for_vanished_tasks(pool: PgPool) {
    let state = common::test_state(pool);
    let app = common::app_with_state(state.clone());

    let owner = register_user(&app, "owner@example.com").await;

    // An event referencing a task that no longer exists is silently
    // dropped -- the triggering mutation already committed.
    let event = taskhive_events::DomainEvent::new(EventKind::TaskAssigned, 424242, owner.id)
        .with_recipients(vec![owner.id]);
    let router = NotificationRouter::new(state.pool.clone(), Arc::clone(&state.ws_manager));
    router.route_event(&event).await.unwrap();

    let response = get(&app, "/api/v1/notifications", Some(&owner.token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn due_soon_tasks_produce_reminders_once(pool: PgPool) {
    let state = common::test_state(pool.clone());
    let app = common::app_with_state(state.clone());

    let owner = register_user(&app, "owner@example.com").await;
    let a = register_user(&app, "a@example.com").await;
    let project_id = create_project(&app, &owner, "Deadlines").await;
    add_member(&app, &owner, project_id, a.id).await;

    let due_at = chrono::Utc::now() + chrono::Duration::hours(3);
    create_task(
        &app,
        &owner,
        project_id,
        serde_json::json!({ "title": "Ship it", "assignee_id": a.id, "due_at": due_at.to_rfc3339() }),
    )
    .await;

    let scheduler = taskhive_events::ReminderScheduler::new(pool);
    scheduler.process_due_tasks().await.unwrap();
    // A second poll must not duplicate the unread reminder.
    scheduler.process_due_tasks().await.unwrap();

    let response = get(&app, "/api/v1/notifications", Some(&a.token)).await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "due_date_reminder");
    assert!(items[0]["message"].as_str().unwrap().contains("Ship it"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn read_state_endpoints(pool: PgPool) {
    let state = common::test_state(pool);
    let app = common::app_with_state(state.clone());
    let mut events = state.event_bus.subscribe();

    let owner = register_user(&app, "owner@example.com").await;
    let a = register_user(&app, "a@example.com").await;
    let b = register_user(&app, "b@example.com").await;
    let project_id = create_project(&app, &owner, "Read").await;
    add_member(&app, &owner, project_id, a.id).await;
    add_member(&app, &owner, project_id, b.id).await;

    create_task(
        &app,
        &owner,
        project_id,
        serde_json::json!({ "assigned_users": [a.id, b.id] }),
    )
    .await;
    let event = events.try_recv().unwrap();
    let router = NotificationRouter::new(state.pool.clone(), Arc::clone(&state.ws_manager));
    router.route_event(&event).await.unwrap();

    let json = body_json(get(&app, "/api/v1/notifications", Some(&a.token)).await).await;
    let notification_id = json["data"][0]["id"].as_i64().unwrap();

    // B cannot mark A's notification.
    let response = post_empty(
        &app,
        &format!("/api/v1/notifications/{notification_id}/read"),
        Some(&b.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A can.
    let response = post_empty(
        &app,
        &format!("/api/v1/notifications/{notification_id}/read"),
        Some(&a.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(
        get(&app, "/api/v1/notifications?unread_only=true", Some(&a.token)).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    // mark-all-read for B.
    let response = post_empty(&app, "/api/v1/notifications/read-all", Some(&b.token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked_read"], 1);
}
