use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub status: String,
    pub endpoints: ApiEndpoints,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEndpoints {
    pub tasks: String,
    pub health: String,
    pub metrics: String,
}

/// 根路径处理器 - 返回系统信息
pub async fn root_handler() -> Json<SystemInfo> {
    Json(SystemInfo {
        name: "priority-scheduler".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "按优先级与截止时间派发任务的调度服务".to_string(),
        status: "running".to_string(),
        endpoints: ApiEndpoints {
            tasks: "/api/tasks".to_string(),
            health: "/health".to_string(),
            metrics: "/metrics".to_string(),
        },
        timestamp: chrono::Utc::now(),
    })
}

pub async fn greet() -> &'static str {
    "Hello, user!"
}
