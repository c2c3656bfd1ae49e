#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;

use solar_fleet::{
    api,
    app::AppState,
    config::{AuthConfig, Config, DbConfig, LoggingConfig, ServerConfig},
    domain::{Role, User},
    repo::{MemoryStore, Repositories},
};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const ADA_TOKEN: &str = "ada-token";
pub const BOB_TOKEN: &str = "bob-token";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            request_timeout_secs: 5,
            enable_cors: false,
            cors_origin: "http://localhost:3000".into(),
        },
        logging: LoggingConfig::default(),
        db: DbConfig::default(),
        auth: AuthConfig::default(),
    }
}

fn user(id: i64, username: &str, token: &str, roles: Vec<Role>) -> User {
    User {
        id,
        username: username.into(),
        token: token.into(),
        roles,
    }
}

/// Router over an in-memory store with an admin (1) and two users (2, 3).
pub fn test_app() -> Router {
    let store = Arc::new(MemoryStore::with_users([
        user(1, "admin", ADMIN_TOKEN, vec![Role::User, Role::Admin]),
        user(2, "ada", ADA_TOKEN, vec![Role::User]),
        user(3, "bob", BOB_TOKEN, vec![Role::User]),
    ]));
    let state = AppState::with_repositories(test_config(), Repositories::from_memory(store));
    api::router(state)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}
