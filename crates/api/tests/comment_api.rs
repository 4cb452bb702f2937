//! HTTP-level integration tests for comments: nesting, author-only
//! mutation rules, and reply cascade on delete.

mod common;

use axum::http::StatusCode;
use common::{
    add_member, body_json, create_project, create_task, delete, get, post_json, put_json,
    register_user,
};
use sqlx::PgPool;

/// Seed a project + task and return (task_id).
async fn seed_task(app: &axum::Router, owner: &common::TestUser) -> i64 {
    let project_id = create_project(app, owner, "Comments").await;
    let task = create_task(app, owner, project_id, serde_json::json!({})).await;
    task["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_and_list_with_replies(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let task_id = seed_task(&app, &owner).await;

    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{task_id}/comments"),
        Some(&owner.token),
        serde_json::json!({ "content": "First!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let top = body_json(response).await;
    let top_id = top["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{task_id}/comments"),
        Some(&owner.token),
        serde_json::json!({ "content": "A reply", "parent_comment_id": top_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(
        &app,
        &format!("/api/v1/tasks/{task_id}/comments"),
        Some(&owner.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let comments = json.as_array().unwrap();

    assert_eq!(comments.len(), 1, "replies are nested, not listed");
    assert_eq!(comments[0]["content"], "First!");
    assert_eq!(comments[0]["author"]["email"], "owner@example.com");
    let replies = comments[0]["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["content"], "A reply");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reply_to_reply_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let task_id = seed_task(&app, &owner).await;

    let top = body_json(
        post_json(
            &app,
            &format!("/api/v1/tasks/{task_id}/comments"),
            Some(&owner.token),
            serde_json::json!({ "content": "top" }),
        )
        .await,
    )
    .await;
    let reply = body_json(
        post_json(
            &app,
            &format!("/api/v1/tasks/{task_id}/comments"),
            Some(&owner.token),
            serde_json::json!({ "content": "reply", "parent_comment_id": top["id"] }),
        )
        .await,
    )
    .await;

    // One level of nesting only.
    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{task_id}/comments"),
        Some(&owner.token),
        serde_json::json!({ "content": "too deep", "parent_comment_id": reply["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn editing_is_author_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let member = register_user(&app, "member@example.com").await;
    let project_id = create_project(&app, &owner, "Comments").await;
    add_member(&app, &owner, project_id, member.id).await;
    let task = create_task(&app, &owner, project_id, serde_json::json!({})).await;
    let task_id = task["id"].as_i64().unwrap();

    let comment = body_json(
        post_json(
            &app,
            &format!("/api/v1/tasks/{task_id}/comments"),
            Some(&owner.token),
            serde_json::json!({ "content": "mine" }),
        )
        .await,
    )
    .await;
    let comment_id = comment["id"].as_i64().unwrap();

    // A fellow team member may not edit or delete someone else's comment.
    let response = put_json(
        &app,
        &format!("/api/v1/comments/{comment_id}"),
        Some(&member.token),
        serde_json::json!({ "content": "hijacked" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete(
        &app,
        &format!("/api/v1/comments/{comment_id}"),
        Some(&member.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The author may edit.
    let response = put_json(
        &app,
        &format!("/api/v1/comments/{comment_id}"),
        Some(&owner.token),
        serde_json::json!({ "content": "edited" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["content"], "edited");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_top_level_comment_takes_replies(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let task_id = seed_task(&app, &owner).await;

    let top = body_json(
        post_json(
            &app,
            &format!("/api/v1/tasks/{task_id}/comments"),
            Some(&owner.token),
            serde_json::json!({ "content": "thread" }),
        )
        .await,
    )
    .await;
    let top_id = top["id"].as_i64().unwrap();

    for i in 0..2 {
        post_json(
            &app,
            &format!("/api/v1/tasks/{task_id}/comments"),
            Some(&owner.token),
            serde_json::json!({ "content": format!("reply {i}"), "parent_comment_id": top_id }),
        )
        .await;
    }

    let response = delete(
        &app,
        &format!("/api/v1/comments/{top_id}"),
        Some(&owner.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        &app,
        &format!("/api/v1/tasks/{task_id}/comments"),
        Some(&owner.token),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_member_cannot_comment(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(&app, "owner@example.com").await;
    let mallory = register_user(&app, "mallory@example.com").await;
    let task_id = seed_task(&app, &owner).await;

    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{task_id}/comments"),
        Some(&mallory.token),
        serde_json::json!({ "content": "let me in" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
