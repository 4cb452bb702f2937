//! HTTP-level integration tests for registration, login, token refresh,
//! and the authentication requirement on protected routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, register_user, TEST_PASSWORD};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn register_returns_tokens_and_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let user = register_user(&app, "new@example.com").await;
    assert!(!user.token.is_empty());
    assert!(!user.refresh_token.is_empty());
    assert!(user.id > 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(&app, "taken@example.com").await;

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        None,
        serde_json::json!({ "email": "taken@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn short_password_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        None,
        serde_json::json!({ "email": "short@example.com", "password": "tiny" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_fails(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(&app, "login@example.com").await;

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        None,
        serde_json::json!({ "email": "login@example.com", "password": "not-the-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_succeeds_with_correct_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(&app, "login-ok@example.com").await;

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        None,
        serde_json::json!({ "email": "login-ok@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].as_str().is_some());
    assert_eq!(json["user"]["email"], "login-ok@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(&app, "rotate@example.com").await;

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        serde_json::json!({ "refresh_token": user.refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert!(refreshed["refresh_token"].as_str().is_some());

    // The old refresh token was revoked by the rotation.
    let replay = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        serde_json::json!({ "refresh_token": user.refresh_token }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_all_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(&app, "logout@example.com").await;

    let response = common::post_empty(&app, "/api/v1/auth/logout", Some(&user.token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let replay = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        serde_json::json!({ "refresh_token": user.refresh_token }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn protected_routes_require_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in [
        "/api/v1/projects",
        "/api/v1/users",
        "/api/v1/notifications",
        "/api/v1/tasks/personal",
    ] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/v1/projects", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
