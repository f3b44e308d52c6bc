//! Test utilities and common setup.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use studentdir::account::{AccountRepository, AccountService, CreateAccountRequest};
use studentdir::api::{AppState, create_router};
use studentdir::auth::{AuthConfig, AuthState};
use studentdir::db::Database;
use studentdir::student::{StudentRepository, StudentService};

/// Signing secret shared by all test apps, so tests can mint their own
/// tokens against the same key.
pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..Default::default()
    }
}

/// Create a test application seeded with two accounts:
/// `admin`/`admin` (ADMIN) and `alice`/`wonderland` (USER).
pub async fn test_app() -> Router {
    let db = Database::in_memory().await.unwrap();

    let auth = AuthState::new(test_auth_config()).unwrap();

    let accounts = AccountService::new(AccountRepository::new(db.pool().clone()));
    let students = StudentService::new(StudentRepository::new(db.pool().clone()));

    accounts.bootstrap().await.unwrap();
    accounts
        .save_account(CreateAccountRequest {
            username: "alice".to_string(),
            password: "wonderland".to_string(),
            email: "alice@example.com".to_string(),
        })
        .await
        .unwrap();

    let state = AppState::new(accounts, students, auth);
    create_router(state)
}

/// POST a JSON body.
pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Send a request with an optional bearer token and optional JSON body.
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in and return the issued token.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/account/login",
        json!({"username": username, "password": password}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}
