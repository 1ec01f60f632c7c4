#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::net::IpAddr;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use sudoku_relay::app::build_app;
use sudoku_relay::config::{Config, Environment};
use sudoku_relay::state::AppState;

pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Development config with an admin password and no external dependencies.
pub fn test_config() -> Config {
    Config {
        server_host: IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "debug".to_string(),
        session_secret: "test-secret-key-for-testing-only-32chars".to_string(),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        cors_origins: Vec::new(),
        max_rooms: 1000,
        room_timeout_secs: 604_800,
        cleanup_interval_secs: 60,
        session_ttl_secs: 3600,
    }
}

/// Fresh state plus the router serving it.
pub fn test_app() -> (AppState, Router) {
    let state = AppState::new(test_config()).unwrap();
    let app = build_app(state.clone());
    (state, app)
}

/// Response pieces the tests care about.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Value of the `sudoku.sid` pair from `Set-Cookie`, ready for a `Cookie` header.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string)
    }
}

/// Send a request to the app and collect the JSON body (Null when empty).
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Test helper: GET with an optional session cookie.
pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    send(app, builder.body(Body::empty()).unwrap()).await
}

/// Test helper: POST a JSON body with an optional session cookie.
pub async fn post_json(app: &Router, uri: &str, body: &Value, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// Minimal valid create-room snapshot.
pub fn snapshot(puzzle_index: i64) -> Value {
    serde_json::json!({
        "board": vec![vec![0; 9]; 9],
        "initialBoard": vec![vec![0; 9]; 9],
        "pencilMarks": vec![vec![Vec::<u8>::new(); 9]; 9],
        "currentPuzzleIndex": puzzle_index,
    })
}
