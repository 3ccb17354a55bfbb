use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

pub const VALID_DUPLICATE_POLICIES: [&str; 3] = ["allow", "reject", "replace"];

/// 调度队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 同一任务ID重复入队时的处理策略
    pub duplicate_policy: String,
    /// 启动时是否从存储中恢复PENDING任务
    pub restore_pending_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: "allow".to_string(),
            restore_pending_on_startup: true,
        }
    }
}

impl ConfigValidator for SchedulerConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_one_of(
            &self.duplicate_policy,
            &VALID_DUPLICATE_POLICIES,
            "scheduler.duplicate_policy",
        )
    }
}

/// 卡住任务检测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub enabled: bool,
    /// 检测间隔（秒）
    pub scan_interval_seconds: u64,
    /// PROCESSING 状态超过该时长视为卡住（秒）
    pub processing_timeout_seconds: u64,
    /// 是否将卡住的任务标记为FAILED
    pub fail_stuck_tasks: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scan_interval_seconds: 60,
            processing_timeout_seconds: 900,
            fail_stuck_tasks: false,
        }
    }
}

impl ConfigValidator for MonitorConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_interval_seconds(
            self.scan_interval_seconds,
            "monitor.scan_interval_seconds",
        )?;
        ValidationUtils::validate_interval_seconds(
            self.processing_timeout_seconds,
            "monitor.processing_timeout_seconds",
        )?;
        Ok(())
    }
}
