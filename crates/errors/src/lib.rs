use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("任务未找到: {id}")]
    TaskNotFound { id: String },
    #[error("非法的状态转换: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("任务已在队列中: {id}")]
    DuplicateTask { id: String },
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
    #[error("数据验证失败: {0}")]
    ValidationError(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

impl SchedulerError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn task_not_found(id: impl Display) -> Self {
        Self::TaskNotFound { id: id.to_string() }
    }
    pub fn invalid_transition(from: impl Display, to: impl Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
    pub fn duplicate_task(id: impl Display) -> Self {
        Self::DuplicateTask { id: id.to_string() }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SchedulerError::Internal(_) | SchedulerError::Configuration(_)
        )
    }
    pub fn is_retryable(&self) -> bool {
        matches!(self, SchedulerError::DatabaseOperation(_))
    }
    pub fn user_message(&self) -> &str {
        match self {
            SchedulerError::TaskNotFound { .. } => "请求的任务不存在",
            SchedulerError::InvalidTransition { .. } => "任务当前状态不允许此操作",
            SchedulerError::DuplicateTask { .. } => "任务已在调度队列中",
            SchedulerError::ValidationError(_) => "输入数据验证失败",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for SchedulerError {
    fn from(err: serde_json::Error) -> Self {
        SchedulerError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for SchedulerError {
    fn from(err: anyhow::Error) -> Self {
        SchedulerError::Internal(err.to_string())
    }
}
