//! 调度服务配置
//!
//! 内置默认值、TOML 配置文件和 `SCHEDULER__` 前缀的环境变量依次覆盖，加载后逐节校验。

pub mod models;
pub mod validation;

pub use models::{
    ApiConfig, AppConfig, MonitorConfig, ObservabilityConfig, SchedulerConfig,
    VALID_DUPLICATE_POLICIES, VALID_LOG_FORMATS, VALID_LOG_LEVELS,
};
pub use validation::{ConfigValidator, ValidationUtils};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置校验失败: {0}")]
    Validation(String),
}
