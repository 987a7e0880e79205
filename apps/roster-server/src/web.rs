use std::time::Duration;

use axum::{middleware::from_fn, response::Json, routing::get, Router};
use roster::Roster;
use runtime::ServerConfig;
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::request_id;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Roster routes plus `/health`, wrapped in the ingress middleware stack.
///
/// Outermost to innermost: SetRequestId -> PropagateRequestId -> Trace ->
/// push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit.
pub fn build_router(roster: &Roster, server: &ServerConfig) -> Router {
    let mut router = roster.register_rest(Router::new().route("/health", get(health_check)));

    router = router.layer(RequestBodyLimitLayer::new(server.max_body_mb * 1024 * 1024));

    if server.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    if server.timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(server.timeout_sec)));
    }

    let x_request_id = request_id::header();
    router
        .layer(from_fn(request_id::push_req_id_to_extensions))
        .layer(request_id::create_trace_layer())
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use roster::RosterConfig;
    use runtime::DatabaseConfig;
    use std::path::Path;
    use tower::ServiceExt;

    async fn test_router(server: ServerConfig) -> Router {
        let db = crate::db::connect(&DatabaseConfig::in_memory(), Path::new("."))
            .await
            .unwrap();
        let roster = Roster::init(db, &RosterConfig::default()).await.unwrap();
        build_router(&roster, &server)
    }

    #[tokio::test]
    async fn health_reports_healthy_with_request_id() {
        let router = test_router(ServerConfig::default()).await;

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let rid = response.headers().get("x-request-id").unwrap();
        assert!(!rid.is_empty());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let router = test_router(ServerConfig::default()).await;

        let response = router
            .oneshot(
                Request::get("/groups/")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let router = test_router(ServerConfig {
            max_body_mb: 0,
            ..Default::default()
        })
        .await;

        let response = router
            .oneshot(
                Request::post("/groups/")
                    .header("content-type", "application/json")
                    .header("content-length", "37")
                    .body(Body::from(r#"{"name":"Preventers","location":"SF"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn cors_preflight_when_enabled() {
        let router = test_router(ServerConfig {
            cors_enabled: true,
            ..Default::default()
        })
        .await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/groups/")
                    .header("origin", "http://example.com")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
