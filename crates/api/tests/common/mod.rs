//! Shared harness for HTTP-level integration tests.
//!
//! Builds the full application router with the same middleware stack as
//! `main.rs` and provides request/auth helpers. Tests drive the router
//! directly via `tower::ServiceExt::oneshot` -- no TCP listener involved.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use taskhive_api::auth::jwt::JwtConfig;
use taskhive_api::config::ServerConfig;
use taskhive_api::routes;
use taskhive_api::state::AppState;
use taskhive_api::ws::WsManager;

/// Build a test `ServerConfig` with a fixed JWT secret and a temp upload
/// directory.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        upload_dir: std::env::temp_dir().join("taskhive-test-uploads"),
        upload_token_ttl_secs: 600,
    }
}

/// Build the shared application state for tests.
///
/// Exposed separately from [`build_test_app`] so tests can subscribe to the
/// event bus or drive the notification router directly.
pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(taskhive_events::EventBus::default()),
    }
}

/// Build the full application router around an existing state.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn app_with_state(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Build the full application router from a bare pool.
pub fn build_test_app(pool: PgPool) -> Router {
    app_with_state(test_state(pool))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a single request through the router.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn post_empty(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::POST, uri, token, None).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::DELETE, uri, token, None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

// ---------------------------------------------------------------------------
// Auth / seed helpers
// ---------------------------------------------------------------------------

/// A registered user with a live access token.
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

/// The password every test account uses.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Register a fresh account and return its tokens.
pub async fn register_user(app: &Router, email: &str) -> TestUser {
    let response = post_json(
        app,
        "/api/v1/auth/register",
        None,
        serde_json::json!({
            "email": email,
            "password": TEST_PASSWORD,
            "name": email.split('@').next(),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration failed");

    let json = body_json(response).await;
    TestUser {
        id: json["user"]["id"].as_i64().expect("user id"),
        email: email.to_string(),
        token: json["access_token"].as_str().expect("access token").to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .expect("refresh token")
            .to_string(),
    }
}

/// Create a project through the API and return its id.
pub async fn create_project(app: &Router, owner: &TestUser, name: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/projects",
        Some(&owner.token),
        serde_json::json!({ "name": name, "color": "#3b82f6" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "project create failed");
    body_json(response).await["id"].as_i64().expect("project id")
}

/// Add a user to a project's team through the API.
pub async fn add_member(app: &Router, owner: &TestUser, project_id: i64, user_id: i64) {
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/members"),
        Some(&owner.token),
        serde_json::json!({ "user_id": user_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "add member failed");
}

/// Create a task through the API from a partial body (title defaults in).
pub async fn create_task(
    app: &Router,
    actor: &TestUser,
    project_id: i64,
    mut body: serde_json::Value,
) -> serde_json::Value {
    if body.get("title").is_none() {
        body["title"] = serde_json::json!("Test task");
    }
    if body.get("priority").is_none() {
        body["priority"] = serde_json::json!("medium");
    }
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/tasks"),
        Some(&actor.token),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "task create failed");
    body_json(response).await
}
