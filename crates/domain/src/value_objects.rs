use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use scheduler_errors::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};

use crate::entities::Task;
use crate::task_status::TaskStatus;

/// 同一任务ID重复入队时的处理策略
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// 不去重，每次入队都产生独立条目
    #[default]
    Allow,
    /// 拒绝重复入队，返回 `DuplicateTask`
    Reject,
    /// 移除已有条目后重新入队
    Replace,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DuplicatePolicy::Allow => "allow",
            DuplicatePolicy::Reject => "reject",
            DuplicatePolicy::Replace => "replace",
        };
        f.write_str(s)
    }
}

impl FromStr for DuplicatePolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(DuplicatePolicy::Allow),
            "reject" => Ok(DuplicatePolicy::Reject),
            "replace" => Ok(DuplicatePolicy::Replace),
            _ => Err(SchedulerError::config_error(format!(
                "Invalid duplicate policy: {s}"
            ))),
        }
    }
}

/// 生产者提交的新任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: i32,
}

impl NewTask {
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.name.trim().is_empty() {
            return Err(SchedulerError::validation_error("任务名称不能为空"));
        }
        Ok(())
    }

    pub fn into_task(self) -> Task {
        Task::new(self.name, self.description, self.due_date, self.priority)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStatusCount {
    pub status: TaskStatus,
    pub count: u64,
}

/// 按状态分组的任务统计
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStatistics {
    /// 按 [`TaskStatus::ALL`] 的顺序排列，缺失的状态计为0
    pub counts: Vec<TaskStatusCount>,
    pub total: u64,
    /// 调度队列中等待分发的条目数
    pub queued: usize,
}

impl TaskStatistics {
    pub fn from_counts(counts: &HashMap<TaskStatus, u64>, queued: usize) -> Self {
        let counts: Vec<TaskStatusCount> = TaskStatus::ALL
            .iter()
            .map(|status| TaskStatusCount {
                status: *status,
                count: counts.get(status).copied().unwrap_or(0),
            })
            .collect();
        let total = counts.iter().map(|c| c.count).sum();
        Self {
            counts,
            total,
            queued,
        }
    }

    pub fn count_of(&self, status: TaskStatus) -> u64 {
        self.counts
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}
