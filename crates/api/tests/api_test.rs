use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use scheduler_api::{create_app, AppState};
use scheduler_config::ApiConfig;
use scheduler_dispatcher::{PriorityScheduler, StuckTaskDetector, TaskDispatchService};
use scheduler_domain::TaskRepository;
use scheduler_infrastructure::{InMemoryTaskRepository, MetricsCollector};
use scheduler_testing_utils::TaskBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    repo: Arc<InMemoryTaskRepository>,
}

fn test_app(with_metrics: bool) -> TestApp {
    let repo = Arc::new(InMemoryTaskRepository::new());
    let metrics = Arc::new(MetricsCollector::new());
    let dispatch_service = Arc::new(TaskDispatchService::new(
        Arc::new(PriorityScheduler::new()),
        repo.clone(),
        metrics.clone(),
    ));
    let stuck_detector = Arc::new(StuckTaskDetector::new(repo.clone(), metrics, None));
    let metrics_handle =
        with_metrics.then(|| PrometheusBuilder::new().build_recorder().handle());

    let state = AppState {
        dispatch_service,
        stuck_detector,
        metrics_handle,
    };
    TestApp {
        router: create_app(state, &ApiConfig::default()),
        repo,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: &Router, name: &str, priority: i32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/tasks",
        Some(json!({ "name": name, "priority": priority })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_greet_and_health() {
    let app = test_app(false);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/greet").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello, user!");

    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["queue_depth"], 0);

    let (status, body) = send(&app.router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "priority-scheduler");
}

#[tokio::test]
async fn test_create_and_dispatch_in_priority_order() {
    let app = test_app(false);
    create(&app.router, "low", 1).await;
    let high = create(&app.router, "high", 9).await;

    let (status, body) = send(&app.router, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["high", "low"]);

    let (_, peeked) = send(&app.router, "GET", "/api/tasks/peek", None).await;
    assert_eq!(peeked["data"]["id"], high.as_str());

    let (status, body) = send(&app.router, "POST", "/api/tasks/next", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], high.as_str());
    assert_eq!(body["data"]["status"], "ASSIGNED");
}

#[tokio::test]
async fn test_empty_queue_returns_null_data() {
    let app = test_app(false);

    let (status, body) = send(&app.router, "POST", "/api/tasks/next", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());

    let (status, body) = send(&app.router, "GET", "/api/tasks/peek", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_lifecycle_endpoints() {
    let app = test_app(false);
    let id = create(&app.router, "job", 3).await;
    send(&app.router, "POST", "/api/tasks/next", None).await;

    let (status, body) = send(&app.router, "POST", &format!("/api/tasks/{id}/start"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "PROCESSING");

    let (status, body) =
        send(&app.router, "POST", &format!("/api/tasks/{id}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "DONE");

    let (status, body) = send(&app.router, "POST", &format!("/api/tasks/{id}/fail"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_release_and_cancel() {
    let app = test_app(false);
    let id = create(&app.router, "job", 3).await;
    send(&app.router, "POST", "/api/tasks/next", None).await;

    let (status, body) =
        send(&app.router, "POST", &format!("/api/tasks/{id}/release"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "PENDING");

    let (_, queued) = send(&app.router, "GET", "/api/tasks", None).await;
    assert_eq!(queued["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app.router, "POST", &format!("/api/tasks/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "CANCELLED");

    let (_, queued) = send(&app.router, "GET", "/api/tasks", None).await;
    assert!(queued["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_and_delete_task() {
    let app = test_app(false);
    let id = create(&app.router, "job", 1).await;

    let (status, body) = send(&app.router, "GET", &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "job");

    let (status, _) = send(&app.router, "DELETE", &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, "GET", &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TASK_NOT_FOUND");

    let (status, _) = send(&app.router, "DELETE", &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_requests() {
    let app = test_app(false);

    let (status, body) = send(&app.router, "GET", "/api/tasks/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/tasks",
        Some(json!({ "name": "   ", "priority": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_enqueue_existing_task() {
    let app = test_app(false);
    let task = TaskBuilder::new().with_name("stored").with_priority(4).build();
    app.repo.create(&task).await.unwrap();

    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/api/tasks/{}/enqueue", task.id()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, peeked) = send(&app.router, "GET", "/api/tasks/peek", None).await;
    assert_eq!(peeked["data"]["name"], "stored");
}

#[tokio::test]
async fn test_stats_and_stuck_tasks() {
    let app = test_app(false);
    create(&app.router, "a", 1).await;
    let stuck = TaskBuilder::new()
        .with_name("stuck")
        .processing()
        .with_updated_at(chrono::Utc::now() - chrono::Duration::hours(2))
        .build();
    app.repo.create(&stuck).await.unwrap();

    let (status, body) = send(&app.router, "GET", "/api/tasks/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["queued"], 1);

    let (status, body) = send(&app.router, "GET", "/api/tasks/stuck", None).await;
    assert_eq!(status, StatusCode::OK);
    let stuck_ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(stuck_ids, vec![stuck.id().to_string().as_str()]);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let disabled = test_app(false);
    let (status, _) = send(&disabled.router, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let enabled = test_app(true);
    let response = enabled
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
