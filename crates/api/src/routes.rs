use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use scheduler_dispatcher::{StuckTaskDetector, TaskDispatchService};

use crate::handlers::{
    health::health_check,
    metrics::metrics_handler,
    root::{greet, root_handler},
    tasks::{
        cancel_task, complete_task, create_task, delete_task, dispatch_next_task, enqueue_task,
        fail_task, get_statistics, get_task, list_queued_tasks, list_stuck_tasks, peek_next_task,
        release_task, start_task,
    },
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub dispatch_service: Arc<TaskDispatchService>,
    pub stuck_detector: Arc<StuckTaskDetector>,
    /// 未启用指标时为 `None`
    pub metrics_handle: Option<PrometheusHandle>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/greet", get(greet))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // 调度队列
        .route("/api/tasks", get(list_queued_tasks).post(create_task))
        .route("/api/tasks/peek", get(peek_next_task))
        .route("/api/tasks/next", post(dispatch_next_task))
        .route("/api/tasks/stats", get(get_statistics))
        .route("/api/tasks/stuck", get(list_stuck_tasks))
        // 单个任务的生命周期
        .route("/api/tasks/{id}", get(get_task).delete(delete_task))
        .route("/api/tasks/{id}/enqueue", post(enqueue_task))
        .route("/api/tasks/{id}/start", post(start_task))
        .route("/api/tasks/{id}/complete", post(complete_task))
        .route("/api/tasks/{id}/fail", post(fail_task))
        .route("/api/tasks/{id}/cancel", post(cancel_task))
        .route("/api/tasks/{id}/release", post(release_task))
        .with_state(state)
}
