//! End-to-end integration tests against the HTTP router

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use auth_hub::config::Config;
use auth_hub::storage::Database;
use auth_hub::{create_router, AppState};

fn setup_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    let config = Config {
        access_token_ttl_seconds: 900,
        app_env: "test".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        cleanup_interval_seconds: 3600,
        data_dir: temp_dir.path().display().to_string(),
        jwt_refresh_secret: "integration-refresh-secret".to_string(),
        jwt_secret: "integration-access-secret".to_string(),
        refresh_token_ttl_seconds: 604_800,
        session_ttl_seconds: 86_400,
    };
    let app = create_router(Arc::new(AppState::new(config, db)));
    (app, temp_dir)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str, email: &str, password: &str) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            json!({ "username": username, "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Log in on the web surface and return the session cookie pair.
async fn login_session(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Log in on the mobile surface and return (access_token, refresh_token).
async fn login_jwt(app: &Router, username: &str, password: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/mobile/login",
            json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    (
        body["data"]["access_token"].as_str().unwrap().to_string(),
        body["data"]["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_health() {
    let (app, _temp) = setup_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_web_session_flow() {
    let (app, _temp) = setup_app();

    register(&app, "alice", "alice@example.com", "password1").await;

    // Login sets a hardened session cookie
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            json!({ "username": "alice", "password": "password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=86400"));
    // Test environment is not production, so no Secure attribute
    assert!(!set_cookie.contains("Secure"));
    // The login body carries the user, never the session id
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password_hash").is_none());

    let cookie = set_cookie.split(';').next().unwrap().to_string();

    // The cookie authenticates /api/me
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");

    // Logout clears the cookie and destroys the session
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // The old cookie no longer authenticates
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let (app, _temp) = setup_app();

    let response = app.clone().oneshot(get("/api/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_web_surface_accepts_bearer_fallback() {
    let (app, _temp) = setup_app();

    register(&app, "alice", "alice@example.com", "password1").await;
    let (access, _refresh) = login_jwt(&app, "alice", "password1").await;

    // A mobile-issued access token also works on the web surface
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_validation_and_conflicts() {
    let (app, _temp) = setup_app();

    // Malformed input
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            json!({ "username": "ab", "email": "a@example.com", "password": "password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    register(&app, "alice", "alice@example.com", "password1").await;

    // Duplicate username and duplicate email produce the same generic message
    let r1 = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            json!({ "username": "alice", "email": "other@example.com", "password": "password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(r1.status(), StatusCode::BAD_REQUEST);
    let b1 = body_json(r1).await;

    let r2 = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            json!({ "username": "bob", "email": "alice@example.com", "password": "password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(r2.status(), StatusCode::BAD_REQUEST);
    let b2 = body_json(r2).await;

    assert_eq!(b1["data"]["message"], b2["data"]["message"]);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let (app, _temp) = setup_app();

    register(&app, "alice", "alice@example.com", "password1").await;

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            json!({ "username": "alice", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let b1 = body_json(wrong_password).await;

    let unknown_user = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            json!({ "username": "mallory", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let b2 = body_json(unknown_user).await;

    assert_eq!(b1, b2);
}

#[tokio::test]
async fn test_mobile_jwt_flow() {
    let (app, _temp) = setup_app();

    // Register on the mobile surface
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/mobile/register",
            json!({ "username": "bob", "email": "bob@example.com", "password": "password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (access, refresh) = login_jwt(&app, "bob", "password1").await;

    // Bearer token authenticates /api/mobile/me
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/mobile/me")
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "bob");

    // Refresh rotates the pair
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/mobile/refresh",
            json!({ "refresh_token": refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let new_refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, refresh);

    // The old refresh token was revoked by the rotation
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/mobile/refresh",
            json!({ "refresh_token": refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The rotated-in one still works
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/mobile/refresh",
            json!({ "refresh_token": new_refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_mobile_logout_revokes_access_token() {
    let (app, _temp) = setup_app();

    register(&app, "carol", "carol@example.com", "password1").await;
    let (access, _refresh) = login_jwt(&app, "carol", "password1").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/mobile/logout")
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The token is dead long before its natural expiry
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/mobile/me")
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mobile_surface_ignores_cookies() {
    let (app, _temp) = setup_app();

    register(&app, "alice", "alice@example.com", "password1").await;
    let cookie = login_session(&app, "alice", "password1").await;

    // A valid session cookie is not a credential on the mobile surface
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/mobile/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_garbage_token() {
    let (app, _temp) = setup_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/mobile/refresh",
            json!({ "refresh_token": "not.a.jwt" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let (app, _temp) = setup_app();

    register(&app, "alice", "alice@example.com", "password1").await;
    let (access, refresh) = login_jwt(&app, "alice", "password1").await;

    // Tokens signed with the access secret never refresh
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/mobile/refresh",
            json!({ "refresh_token": access }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And refresh tokens never pass as access tokens
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/mobile/me")
                .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile() {
    let (app, _temp) = setup_app();

    register(&app, "alice", "alice@example.com", "password1").await;
    let cookie = login_session(&app, "alice", "password1").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/profile")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "display_name": "Alice A.", "bio": "hello" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["display_name"], "Alice A.");
    assert_eq!(body["data"]["bio"], "hello");
    // Untouched fields survive
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_web_logout_is_idempotent() {
    let (app, _temp) = setup_app();

    // Logout without any session still succeeds and clears the cookie
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
