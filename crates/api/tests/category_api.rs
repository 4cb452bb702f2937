//! HTTP-level integration tests for categories: ordering assignment,
//! membership gating, and release-on-delete.

mod common;

use axum::http::StatusCode;
use common::{
    add_member, body_json, create_project, create_task, delete, get, post_json, put_json,
    register_user,
};
use sqlx::PgPool;

async fn create_category(
    app: &axum::Router,
    token: &str,
    project_id: i64,
    name: &str,
) -> serde_json::Value {
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/categories"),
        Some(token),
        serde_json::json!({ "name": name, "color": "#6366f1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn first_category_order_zero_second_one(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let project_id = create_project(&app, &owner, "Board").await;

    let first = create_category(&app, &owner.token, project_id, "Backlog").await;
    let second = create_category(&app, &owner.token, project_id, "Doing").await;

    assert_eq!(first["sort_order"], 0);
    assert_eq!(second["sort_order"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_member_cannot_touch_categories(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let mallory = register_user(&app, "mallory@example.com").await;
    let project_id = create_project(&app, &owner, "Board").await;
    let category = create_category(&app, &owner.token, project_id, "Backlog").await;
    let category_id = category["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        &format!("/api/v1/projects/{project_id}/categories"),
        Some(&mallory.token),
        serde_json::json!({ "name": "Sneaky", "color": "#000000" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(
        &app,
        &format!("/api/v1/projects/{project_id}/categories"),
        Some(&mallory.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete(
        &app,
        &format!("/api/v1/categories/{category_id}"),
        Some(&mallory.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn member_can_rename_category(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let member = register_user(&app, "member@example.com").await;
    let project_id = create_project(&app, &owner, "Board").await;
    add_member(&app, &owner, project_id, member.id).await;
    let category = create_category(&app, &owner.token, project_id, "Backlog").await;
    let category_id = category["id"].as_i64().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/categories/{category_id}"),
        Some(&member.token),
        serde_json::json!({ "name": "Icebox" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Icebox");
    // Color untouched by the partial patch.
    assert_eq!(json["color"], "#6366f1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_releases_tasks_instead_of_deleting(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let project_id = create_project(&app, &owner, "Board").await;
    let category = create_category(&app, &owner.token, project_id, "Doomed").await;
    let category_id = category["id"].as_i64().unwrap();

    for i in 0..3 {
        create_task(
            &app,
            &owner,
            project_id,
            serde_json::json!({ "title": format!("Task {i}"), "category_id": category_id }),
        )
        .await;
    }

    let response = delete(
        &app,
        &format!("/api/v1/categories/{category_id}"),
        Some(&owner.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // All three tasks survive, uncategorized.
    let response = get(
        &app,
        &format!("/api/v1/projects/{project_id}/tasks"),
        Some(&owner.token),
    )
    .await;
    let tasks = body_json(response).await;
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    for task in tasks {
        assert!(task["category_id"].is_null());
    }
}
