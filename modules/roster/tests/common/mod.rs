//! Shared fixtures for the roster integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

use roster::config::{HashingConfig, RosterConfig};
use roster::Roster;

/// Module config with Argon2 costs low enough for tests.
pub fn test_config() -> RosterConfig {
    RosterConfig {
        hashing: HashingConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
            max_secret_len: 64,
        },
        ..RosterConfig::default()
    }
}

/// Fresh in-memory SQLite database. A single pooled connection keeps the
/// database alive for the whole test.
pub async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(opts)
        .await
        .expect("Failed to connect to test database")
}

/// Migrated database plus a wired module.
pub async fn create_test_roster() -> (Roster, DatabaseConnection) {
    let db = create_test_db().await;
    let roster = Roster::init(db.clone(), &test_config())
        .await
        .expect("Failed to init roster module");
    (roster, db)
}

/// Build an Axum router by calling the real route registration.
pub async fn create_test_router() -> Router {
    let (roster, _db) = create_test_roster().await;
    roster.register_rest(Router::new())
}

/// Send one request through the router; returns status and parsed JSON body
/// (`Value::Null` for an empty body).
pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(router, request).await
}

pub async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
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
