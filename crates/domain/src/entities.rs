use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use scheduler_errors::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task_status::TaskStatus;

/// 任务唯一标识，创建时生成，之后不可变
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| SchedulerError::validation_error(format!("无效的任务ID '{s}': {e}")))
    }
}

/// 可调度的工作单元
///
/// 状态只能通过生命周期方法修改，标识只能在构造或从 [`TaskRecord`] 恢复时设置。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    due_date: Option<DateTime<Utc>>,
    /// 数值越大越紧急
    priority: i32,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// 存储层使用的扁平任务记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i32,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
        priority: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            name: name.into(),
            description: description.into(),
            due_date,
            priority,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }
    pub fn priority(&self) -> i32 {
        self.priority
    }
    pub fn status(&self) -> TaskStatus {
        self.status
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    /// 最后一次状态或属性变更的时间，卡住任务检测依赖此字段
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }
    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
        self.touch();
    }
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
        self.touch();
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// 只有PENDING任务可以被分配；成功返回true，否则状态保持不变并返回false
    pub fn assign_task(&mut self) -> bool {
        self.transition_to(TaskStatus::Assigned).is_ok()
    }

    pub fn start_processing(&mut self) -> SchedulerResult<()> {
        self.transition_to(TaskStatus::Processing)
    }
    pub fn mark_as_done(&mut self) -> SchedulerResult<()> {
        self.transition_to(TaskStatus::Done)
    }
    pub fn mark_as_failed(&mut self) -> SchedulerResult<()> {
        self.transition_to(TaskStatus::Failed)
    }
    pub fn cancel(&mut self) -> SchedulerResult<()> {
        self.transition_to(TaskStatus::Cancelled)
    }
    /// 将已分配但未开始的任务退回PENDING
    pub fn release(&mut self) -> SchedulerResult<()> {
        self.transition_to(TaskStatus::Pending)
    }

    pub fn transition_to(&mut self, status: TaskStatus) -> SchedulerResult<()> {
        self.status = self.status.transition(status)?;
        self.touch();
        Ok(())
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            priority: self.priority,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn entity_description(&self) -> String {
        format!(
            "任务 '{}' (ID: {}, 优先级: {}, 状态: {})",
            self.name, self.id, self.priority, self.status
        )
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            due_date: record.due_date,
            priority: record.priority,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
