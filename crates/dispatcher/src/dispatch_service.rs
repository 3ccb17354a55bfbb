//! 任务派发服务
//!
//! 把内存调度队列与任务仓储组合起来：仓储是任务记录的唯一来源，队列只保存等待派发的任务。

use std::sync::Arc;

use scheduler_domain::{
    NewTask, StatusChange, Task, TaskId, TaskRepository, TaskStatistics, TaskStatus,
};
use scheduler_errors::{SchedulerError, SchedulerResult};
use scheduler_infrastructure::MetricsCollector;
use tracing::{debug, info, warn};

use crate::priority_scheduler::PriorityScheduler;

pub struct TaskDispatchService {
    scheduler: Arc<PriorityScheduler>,
    task_repo: Arc<dyn TaskRepository>,
    metrics: Arc<MetricsCollector>,
}

impl TaskDispatchService {
    pub fn new(
        scheduler: Arc<PriorityScheduler>,
        task_repo: Arc<dyn TaskRepository>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            scheduler,
            task_repo,
            metrics,
        }
    }

    pub fn scheduler(&self) -> &Arc<PriorityScheduler> {
        &self.scheduler
    }

    /// 创建任务记录并放入调度队列
    pub async fn submit_task(&self, new_task: NewTask) -> SchedulerResult<Task> {
        new_task.validate()?;
        let task = self.task_repo.create(&new_task.into_task()).await?;
        self.scheduler.add_task(task.clone())?;
        self.metrics.record_enqueued(self.scheduler.size());

        info!("任务已提交: {}", task.entity_description());
        Ok(task)
    }

    /// 把已存在的 PENDING 任务重新放入队列
    pub async fn enqueue_task(&self, id: TaskId) -> SchedulerResult<Task> {
        let task = self.get_task(id).await?;
        if !task.is_pending() {
            return Err(SchedulerError::invalid_transition(
                task.status(),
                TaskStatus::Pending,
            ));
        }

        self.scheduler.add_task(task.clone())?;
        self.metrics.record_enqueued(self.scheduler.size());
        debug!(task_id = %id, "任务已重新入队");
        Ok(task)
    }

    /// 取出下一个任务并标记为 ASSIGNED
    ///
    /// 分配通过仓储的原子状态更新完成；已不是 PENDING 或已被删除的条目会被跳过，
    /// 同一任务的多个队列条目最多被派发一次。队列为空时返回 `None`。
    pub async fn dispatch_next(&self) -> SchedulerResult<Option<Task>> {
        while let Some(queued) = self.scheduler.get_next_task() {
            let id = queued.id();
            let change = match self.task_repo.update_status(id, TaskStatus::Assigned).await {
                Ok(change) => change,
                Err(SchedulerError::TaskNotFound { .. }) => {
                    debug!(task_id = %id, "跳过已删除的队列条目");
                    continue;
                }
                Err(e @ SchedulerError::InvalidTransition { .. }) => {
                    debug!(task_id = %id, "跳过状态已变化的队列条目: {}", e);
                    continue;
                }
                Err(e) => {
                    self.requeue(queued);
                    return Err(e);
                }
            };

            let task = change.task;
            self.metrics.record_transition(change.from, TaskStatus::Assigned);
            self.metrics.record_dispatched(self.scheduler.size());
            info!(
                task_id = %task.id(),
                priority = task.priority(),
                "任务已派发: {}",
                task.name()
            );
            return Ok(Some(task));
        }

        self.metrics.update_queue_depth(0);
        Ok(None)
    }

    fn requeue(&self, task: Task) {
        let id = task.id();
        if let Err(e) = self.scheduler.add_task(task) {
            warn!(task_id = %id, "派发失败后重新入队失败: {}", e);
        }
    }

    pub fn peek_next(&self) -> Option<Task> {
        self.scheduler.peek_next_task()
    }

    pub fn queued_tasks(&self) -> Vec<Task> {
        self.scheduler.get_all_tasks()
    }

    pub async fn start_task(&self, id: TaskId) -> SchedulerResult<Task> {
        self.transition(id, TaskStatus::Processing).await
    }

    pub async fn complete_task(&self, id: TaskId) -> SchedulerResult<Task> {
        self.transition(id, TaskStatus::Done).await
    }

    pub async fn fail_task(&self, id: TaskId) -> SchedulerResult<Task> {
        self.transition(id, TaskStatus::Failed).await
    }

    /// 取消任务，同时从队列中移除它的所有条目
    pub async fn cancel_task(&self, id: TaskId) -> SchedulerResult<Task> {
        let task = self.transition(id, TaskStatus::Cancelled).await?;
        self.drop_from_queue(id);
        Ok(task)
    }

    /// 把已分配但未开始的任务退回 PENDING 并重新入队
    pub async fn release_task(&self, id: TaskId) -> SchedulerResult<Task> {
        let task = self.transition(id, TaskStatus::Pending).await?;
        self.scheduler.add_task(task.clone())?;
        self.metrics.record_enqueued(self.scheduler.size());
        Ok(task)
    }

    /// 删除任务记录；返回记录是否存在
    pub async fn delete_task(&self, id: TaskId) -> SchedulerResult<bool> {
        self.drop_from_queue(id);
        let deleted = self.task_repo.delete(id).await?;
        if deleted {
            info!(task_id = %id, "任务已删除");
        }
        Ok(deleted)
    }

    fn drop_from_queue(&self, id: TaskId) {
        let mut removed = 0;
        while self.scheduler.remove_task_by_id(id).is_some() {
            removed += 1;
        }
        if removed > 0 {
            self.metrics.record_removed(self.scheduler.size());
            debug!(task_id = %id, removed, "已从调度队列移除");
        }
    }

    /// 启动时从仓储恢复 PENDING 任务，返回新入队的数量
    pub async fn restore_pending_tasks(&self) -> SchedulerResult<usize> {
        let pending = self
            .task_repo
            .find_by_status_ordered(TaskStatus::Pending)
            .await?;

        let mut restored = 0;
        for task in pending {
            if self.scheduler.contains(task.id()) {
                continue;
            }
            self.scheduler.add_task(task)?;
            restored += 1;
        }

        self.metrics.update_queue_depth(self.scheduler.size());
        info!("从仓储恢复了 {} 个待调度任务", restored);
        Ok(restored)
    }

    pub async fn get_task(&self, id: TaskId) -> SchedulerResult<Task> {
        self.task_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| SchedulerError::task_not_found(id))
    }

    pub async fn statistics(&self) -> SchedulerResult<TaskStatistics> {
        let counts = self.task_repo.count_by_status().await?;
        Ok(TaskStatistics::from_counts(&counts, self.scheduler.size()))
    }

    async fn transition(&self, id: TaskId, to: TaskStatus) -> SchedulerResult<Task> {
        let StatusChange { from, task } = self.task_repo.update_status(id, to).await?;
        self.metrics.record_transition(from, to);
        info!(task_id = %id, from = %from, to = %to, "任务状态已变更");
        Ok(task)
    }
}
