//! # Scheduler API
//!
//! 调度服务的 HTTP 接口，基于 Axum。
//!
//! ## API 端点
//!
//! - `GET /` 系统信息，`GET /greet` 问候，`GET /health` 健康检查，`GET /metrics` Prometheus 指标
//! - `POST /api/tasks` 创建并入队，`GET /api/tasks` 队列快照
//! - `GET /api/tasks/peek` 查看下一个任务，`POST /api/tasks/next` 派发下一个任务
//! - `GET /api/tasks/stats` 状态统计，`GET /api/tasks/stuck` 卡住的任务
//! - `GET|DELETE /api/tasks/{id}`
//! - `POST /api/tasks/{id}/enqueue|start|complete|fail|cancel|release`
//!
//! ## 响应格式
//!
//! ```json
//! { "success": true, "data": { ... }, "message": null, "timestamp": "2024-01-01T00:00:00Z" }
//! ```
//!
//! 错误响应：
//!
//! ```json
//! { "success": false, "error": { "code": "INVALID_TRANSITION", "message": "..." }, "timestamp": "..." }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use scheduler_config::ApiConfig;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, api_config: &ApiConfig) -> Router {
    let router = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if api_config.cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
