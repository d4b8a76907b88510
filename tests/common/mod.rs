#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use recipebox::config::Config;
use serde_json::{Value, json};
use std::path::PathBuf;
use tower::ServiceExt;

pub const PASSWORD: &str = "testpass123";

/// Config backed by an in-memory database, a throwaway media directory and
/// cheap Argon2 parameters.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.media_path = media_dir().to_string_lossy().into_owned();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

fn media_dir() -> PathBuf {
    std::env::temp_dir().join(format!("recipebox-test-{}", uuid::Uuid::new_v4()))
}

pub async fn spawn_app() -> Router {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> Router {
    let state = recipebox::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    recipebox::api::router(state).await
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Token {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", mime::APPLICATION_JSON.as_ref());
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends a request and returns the status with the decoded envelope.
pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(app, method, uri, token, body).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Signs up `email` and returns its token.
pub async fn register(app: &Router, email: &str) -> String {
    let (status, _) = call(
        app,
        "POST",
        "/api/user/create",
        None,
        Some(json!({"email": email, "password": PASSWORD, "name": "Test name"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

pub async fn create_tag(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = call(
        app,
        "POST",
        "/api/recipe/tags",
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

pub async fn create_ingredient(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = call(
        app,
        "POST",
        "/api/recipe/ingredients",
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

pub async fn create_recipe(app: &Router, token: &str, payload: Value) -> Value {
    let (status, body) = call(app, "POST", "/api/recipe/recipes", Some(token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

pub fn sample_recipe(title: &str) -> Value {
    json!({"title": title, "time_minutes": 10, "price": "5.00"})
}

/// Builds a `multipart/form-data` body with a single file field.
pub fn multipart(field: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "recipeboxtestboundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (
        format!("{}; boundary={boundary}", mime::MULTIPART_FORM_DATA),
        body,
    )
}

/// A small, fully decodable PNG.
pub fn png() -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image::RgbImage::new(2, 2)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
