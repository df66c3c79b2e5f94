//! Integration tests for API routes.
//!
//! Uses `tower::ServiceExt` to test Axum routes without a real HTTP server,
//! backed by the in-memory repository so no database is needed.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use courier_api::routes::create_router;
use courier_api::state::AppState;
use courier_common::config::AppConfig;
use courier_queue::MemoryTaskRepository;

// ============================================================
// Helpers
// ============================================================

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "unused".to_string(),
        db_max_connections: 5,
        api_bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        dispatcher_batch_size: 10,
        dispatcher_poll_interval_ms: 100,
    }
}

fn test_app() -> Router {
    app_with(test_config())
}

fn app_with(config: AppConfig) -> Router {
    let state = AppState::new(Arc::new(MemoryTaskRepository::new()), config);
    create_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, subject: &str, is_priority: bool) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/api/message-tasks",
        Some(serde_json::json!({
            "recipient_id": 5,
            "instance_id": 9,
            "user": "ops",
            "subject": subject,
            "body": "node offline",
            "is_priority": is_priority
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["id"].as_i64().unwrap()
}

fn pending_ids(json: &serde_json::Value) -> Vec<i64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

// ============================================================
// Route tests
// ============================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "courier-api");
}

#[tokio::test]
async fn test_create_and_get_task() {
    let app = test_app();
    let id = create(&app, "disk full", true).await;

    let (status, json) = send(&app, "GET", &format!("/api/message-tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["visibility"], "enabled");
    assert_eq!(json["is_priority"], true);
    assert_eq!(json["user"], "ops");
    assert!(json["completed_at"].is_null());
}

#[tokio::test]
async fn test_dispatch_flow_via_api() {
    let app = test_app();
    let a = create(&app, "A", true).await;
    let b = create(&app, "B", false).await;
    let c = create(&app, "C", true).await;

    let (_, json) = send(&app, "GET", "/api/message-tasks/pending?limit=10", None).await;
    assert_eq!(pending_ids(&json), vec![a, c, b]);

    let (_, json) = send(&app, "GET", "/api/message-tasks/pending?limit=2", None).await;
    assert_eq!(pending_ids(&json), vec![a, c]);

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/message-tasks/{}/status", a),
        Some(serde_json::json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");

    // A second soft claim loses the race.
    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/message-tasks/{}/status", a),
        Some(serde_json::json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "conflict");
    assert_eq!(json["current"], "in_progress");

    let (_, json) = send(
        &app,
        "POST",
        &format!("/api/message-tasks/{}/status", a),
        Some(serde_json::json!({"status": "succeeded", "result": "OK"})),
    )
    .await;
    assert_eq!(json["outcome"], "applied");

    let (_, json) = send(&app, "GET", &format!("/api/message-tasks/{}", a), None).await;
    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["result"], "OK");
    assert!(json["completed_at"].as_i64().unwrap() > 0);

    let (_, json) = send(&app, "GET", "/api/message-tasks/pending", None).await;
    assert_eq!(pending_ids(&json), vec![c, b]);

    let (status, json) = send(&app, "POST", &format!("/api/message-tasks/{}/disable", b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["visibility"], "disabled");

    let (_, json) = send(&app, "GET", "/api/message-tasks/pending?limit=10", None).await;
    assert_eq!(pending_ids(&json), vec![c]);

    let (status, _) = send(&app, "GET", &format!("/api/message-tasks/{}", b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", &format!("/api/message-tasks/{}/enable", b), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = send(&app, "GET", "/api/message-tasks/pending?limit=10", None).await;
    assert_eq!(pending_ids(&json), vec![c, b]);
}

#[tokio::test]
async fn test_non_positive_limit_returns_empty() {
    let app = test_app();
    create(&app, "A", false).await;

    let (status, json) = send(&app, "GET", "/api/message-tasks/pending?limit=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());

    let (_, json) = send(&app, "GET", "/api/message-tasks/pending?limit=-3", None).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_limit_defaults_to_batch_size() {
    let app = app_with(AppConfig {
        dispatcher_batch_size: 2,
        ..test_config()
    });
    let a = create(&app, "A", false).await;
    let b = create(&app, "B", false).await;
    create(&app, "C", false).await;

    let (_, json) = send(&app, "GET", "/api/message-tasks/pending", None).await;
    assert_eq!(pending_ids(&json), vec![a, b]);
}

#[tokio::test]
async fn test_claiming_disabled_task_conflicts() {
    let app = test_app();
    let a = create(&app, "A", false).await;
    send(&app, "POST", &format!("/api/message-tasks/{}/disable", a), None).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/message-tasks/{}/status", a),
        Some(serde_json::json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "conflict");
    assert_eq!(json["current"], "pending");
}

#[tokio::test]
async fn test_invalid_task_id_rejected() {
    let app = test_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/message-tasks/0/status",
        Some(serde_json::json!({"status": "failed", "result": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("positive"));
}

#[tokio::test]
async fn test_unknown_task_not_found() {
    let app = test_app();
    let (status, _) = send(&app, "POST", "/api/message-tasks/77/disable", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/message-tasks/77/status",
        Some(serde_json::json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
