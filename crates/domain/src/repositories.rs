//! 领域仓储抽象
//!
//! 任务记录的持久化协作者，调度核心只依赖这里的接口

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scheduler_errors::SchedulerResult;

use crate::entities::{Task, TaskId};
use crate::task_status::TaskStatus;

/// 一次状态更新的结果，`from` 取自更新时仓储中的记录
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub from: TaskStatus,
    pub task: Task,
}

/// 任务仓储抽象
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> SchedulerResult<Task>;
    async fn find_by_id(&self, id: TaskId) -> SchedulerResult<Option<Task>>;
    async fn find_all(&self) -> SchedulerResult<Vec<Task>>;
    /// 覆盖已有记录的非状态字段；记录不存在时返回 `TaskNotFound`，
    /// 状态与存储中不一致时返回 `InvalidTransition`。状态只能通过 `update_status` 修改
    async fn update(&self, task: &Task) -> SchedulerResult<Task>;
    async fn delete(&self, id: TaskId) -> SchedulerResult<bool>;

    async fn find_by_status(&self, status: TaskStatus) -> SchedulerResult<Vec<Task>>;
    async fn find_by_priority_at_least(&self, priority: i32) -> SchedulerResult<Vec<Task>>;
    /// 按优先级降序、截止时间升序返回指定状态的任务
    async fn find_by_status_ordered(&self, status: TaskStatus) -> SchedulerResult<Vec<Task>>;
    async fn find_due_before(&self, due_date: DateTime<Utc>) -> SchedulerResult<Vec<Task>>;
    async fn find_by_status_and_priority(
        &self,
        status: TaskStatus,
        priority: i32,
    ) -> SchedulerResult<Vec<Task>>;
    /// 下一批待处理任务：指定状态且优先级不低于阈值，按调度顺序排列
    async fn find_high_priority_tasks(
        &self,
        status: TaskStatus,
        min_priority: i32,
    ) -> SchedulerResult<Vec<Task>>;

    /// 按生命周期规则原子地更新状态，非法转换返回 `InvalidTransition`
    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> SchedulerResult<StatusChange>;

    async fn count_by_status(&self) -> SchedulerResult<HashMap<TaskStatus, u64>>;
    /// PROCESSING 且最后更新时间早于 `cutoff` 的任务
    async fn find_stuck_tasks(&self, cutoff: DateTime<Utc>) -> SchedulerResult<Vec<Task>>;
}
