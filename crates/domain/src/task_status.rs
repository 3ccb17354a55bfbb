//! 任务生命周期状态机
//!
//! 合法的状态边以数据表的形式声明，所有状态变更都必须经过 [`TaskStatus::transition`]。

use std::fmt;
use std::str::FromStr;

use scheduler_errors::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// 初始状态，可被调度
    #[default]
    #[serde(rename = "PENDING")]
    Pending,
    /// 已分配给Worker，尚未开始
    #[serde(rename = "ASSIGNED")]
    Assigned,
    #[serde(rename = "PROCESSING")]
    Processing,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "FAILED")]
    Failed,
    /// 被用户或系统取消
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

/// 生命周期中所有合法的状态边 (from, to)
pub const LEGAL_TRANSITIONS: &[(TaskStatus, TaskStatus)] = &[
    (TaskStatus::Pending, TaskStatus::Assigned),
    (TaskStatus::Pending, TaskStatus::Cancelled),
    (TaskStatus::Assigned, TaskStatus::Processing),
    (TaskStatus::Assigned, TaskStatus::Pending),
    (TaskStatus::Assigned, TaskStatus::Failed),
    (TaskStatus::Assigned, TaskStatus::Cancelled),
    (TaskStatus::Processing, TaskStatus::Done),
    (TaskStatus::Processing, TaskStatus::Failed),
    (TaskStatus::Processing, TaskStatus::Cancelled),
];

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Pending,
        TaskStatus::Assigned,
        TaskStatus::Processing,
        TaskStatus::Done,
        TaskStatus::Failed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Assigned => "ASSIGNED",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::Done => "DONE",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// DONE / FAILED / CANCELLED 之后不允许任何转换
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Done | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, to: TaskStatus) -> bool {
        LEGAL_TRANSITIONS
            .iter()
            .any(|&(from, target)| from == *self && target == to)
    }

    /// 校验并返回新状态；非法边返回 `InvalidTransition`
    pub fn transition(self, to: TaskStatus) -> SchedulerResult<TaskStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(SchedulerError::invalid_transition(self, to))
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TaskStatus::Pending),
            "ASSIGNED" => Ok(TaskStatus::Assigned),
            "PROCESSING" => Ok(TaskStatus::Processing),
            "DONE" => Ok(TaskStatus::Done),
            "FAILED" => Ok(TaskStatus::Failed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            _ => Err(SchedulerError::validation_error(format!(
                "Invalid task status: {s}"
            ))),
        }
    }
}
