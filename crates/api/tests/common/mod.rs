#![allow(dead_code)]

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use realeagent_api::auth::jwt::JwtConfig;
use realeagent_api::auth::password::hash_password;
use realeagent_api::config::{ServerConfig, StorageConfig};
use realeagent_api::router::build_app_router;
use realeagent_api::state::AppState;
use realeagent_db::seed::DEMO_PASSWORD;
use realeagent_db::{DbPool, MemoryStore};

pub const AGENT_EMAIL: &str = "agent@realeagent.com";
pub const BROKER_EMAIL: &str = "broker@realeagent.com";
pub const ADMIN_EMAIL: &str = "admin@realeagent.com";

/// A router over a freshly seeded store. Generated PDFs land in `storage_dir`,
/// which is removed when the value is dropped.
pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub storage_dir: TempDir,
}

/// Argon2 is slow; hash the demo password once per test binary.
fn demo_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(DEMO_PASSWORD).expect("hashing should succeed"))
}

/// Local storage only, and a templates directory that does not exist so
/// every template is filled onto a blank form.
pub fn test_config(storage_dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        templates_dir: storage_dir.path().join("no-templates"),
        jwt: JwtConfig {
            secret: "integration-test-secret-with-enough-entropy".to_string(),
            expiry_hours: 24,
        },
        storage: StorageConfig {
            local_dir: storage_dir.path().join("documents"),
            s3: None,
        },
    }
}

pub async fn build_test_app() -> TestApp {
    build_test_app_with(|_| {}).await
}

/// Like [`build_test_app`], with `adjust` applied to the config first.
pub async fn build_test_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("tempdir");
    let mut config = test_config(&storage_dir);
    adjust(&mut config);
    let pool = MemoryStore::with_demo_data(demo_hash())
        .await
        .expect("seeding should succeed");
    let state = AppState::new(pool.clone(), config.clone());
    TestApp {
        router: build_app_router(state, &config),
        pool,
        storage_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: &Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch_json_auth(app: &Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Log in as a seeded demo user and return the bearer token.
pub async fn login(app: &Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": DEMO_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 200, "login as {email} should succeed");
    let json = body_json(response).await;
    json["data"]["token"].as_str().unwrap().to_string()
}
