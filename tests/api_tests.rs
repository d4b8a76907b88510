mod common;

use axum::http::StatusCode;
use common::{PASSWORD, call, register, send, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_create_valid_user_success() {
    let app = spawn_app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/user/create",
        None,
        Some(json!({"email": "test@DOMAIN.com", "password": PASSWORD, "name": "Test name"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "test@domain.com");
    assert_eq!(body["data"]["name"], "Test name");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_create_duplicate_user_fails() {
    let app = spawn_app().await;
    let payload = json!({"email": "dup@example.com", "password": PASSWORD});

    let (status, _) = call(&app, "POST", "/api/user/create", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "POST", "/api/user/create", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_password_too_short_creates_nothing() {
    let app = spawn_app().await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/user/create",
        None,
        Some(json!({"email": "short@example.com", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "short@example.com", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_without_email_fails() {
    let app = spawn_app().await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/user/create",
        None,
        Some(json!({"password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_is_stable_per_account() {
    let app = spawn_app().await;

    let first = register(&app, "stable@example.com").await;
    assert_eq!(first.len(), 40);

    let (status, body) = call(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "stable@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], first.as_str());
}

#[tokio::test]
async fn test_token_invalid_credentials() {
    let app = spawn_app().await;
    register(&app, "known@example.com").await;

    let (wrong_status, wrong_body) = call(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "known@example.com", "password": "wrong"})),
    )
    .await;
    let (unknown_status, unknown_body) = call(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "nobody@example.com", "password": PASSWORD})),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert!(wrong_body["data"].is_null());
    // Both failures read the same so the email's existence is not revealed.
    assert_eq!(wrong_body["error"], unknown_body["error"]);
    assert_eq!(
        wrong_body["error"],
        "Unable to authenticate with provided credentials"
    );
}

#[tokio::test]
async fn test_token_missing_field() {
    let app = spawn_app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "one", "password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_retrieve_user_unauthorized() {
    let app = spawn_app().await;

    let (status, _) = call(&app, "GET", "/api/user/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", "/api/user/me", Some(&"0".repeat(40)), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", "/api/user/me", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_scheme_accepted() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = spawn_app().await;
    let token = register(&app, "bearer@example.com").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/user/me")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_retrieve_profile_success() {
    let app = spawn_app().await;
    let token = register(&app, "me@example.com").await;

    let (status, body) = call(&app, "GET", "/api/user/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"email": "me@example.com", "name": "Test name"}));
}

#[tokio::test]
async fn test_post_me_not_allowed() {
    let app = spawn_app().await;
    let token = register(&app, "post@example.com").await;

    let (status, _) = call(&app, "POST", "/api/user/me", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_update_user_profile() {
    let app = spawn_app().await;
    let token = register(&app, "update@example.com").await;

    let (status, body) = call(
        &app,
        "PATCH",
        "/api/user/me",
        Some(&token),
        Some(json!({"name": "new name", "password": "newpassword123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "new name");

    let (status, _) = call(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "update@example.com", "password": "newpassword123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "update@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_me_requires_email_and_password() {
    let app = spawn_app().await;
    let token = register(&app, "put@example.com").await;

    let (status, _) = call(
        &app,
        "PUT",
        "/api/user/me",
        Some(&token),
        Some(json!({"name": "only name"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "PUT",
        "/api/user/me",
        Some(&token),
        Some(json!({"email": "moved@EXAMPLE.com", "password": "another123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "moved@example.com");
    assert_eq!(body["data"]["name"], "");
}

#[tokio::test]
async fn test_update_email_to_taken_address_fails() {
    let app = spawn_app().await;
    register(&app, "taken@example.com").await;
    let token = register(&app, "mover@example.com").await;

    let (status, _) = call(
        &app,
        "PATCH",
        "/api/user/me",
        Some(&token),
        Some(json!({"email": "taken@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;

    let (status, body) = call(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_metrics_requires_token() {
    let app = spawn_app().await;

    let (status, _) = call(&app, "GET", "/api/metrics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;

    let response = {
        use axum::{body::Body, http::Request};
        use tower::ServiceExt;

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/user/create")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap()
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app().await;

    let response = send(&app, "GET", "/api/health", None, None).await;
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(request_id.len(), 36);
}
