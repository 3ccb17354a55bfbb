use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scheduler_errors::SchedulerError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("调度器错误: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("未找到资源")]
    NotFound,

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Scheduler(SchedulerError::TaskNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "TASK_NOT_FOUND")
            }
            ApiError::Scheduler(SchedulerError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION")
            }
            ApiError::Scheduler(SchedulerError::DuplicateTask { .. }) => {
                (StatusCode::CONFLICT, "DUPLICATE_TASK")
            }
            ApiError::Scheduler(SchedulerError::ValidationError(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::Scheduler(_) | ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // 500 只返回通用提示，细节写日志
        let message = match &self {
            ApiError::Scheduler(e) if status.is_server_error() => {
                tracing::error!("请求处理失败: {}", e);
                e.user_message().to_string()
            }
            ApiError::Internal(msg) => {
                tracing::error!("请求处理失败: {}", msg);
                "系统内部错误".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message,
            },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
