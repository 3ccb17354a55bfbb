use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scheduler_domain::{
    sort_by_dispatch_order, StatusChange, Task, TaskId, TaskRepository, TaskStatus,
};
use scheduler_errors::{SchedulerError, SchedulerResult};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 内存任务仓储
///
/// 以任务ID为键保存任务记录，适用于嵌入式部署和测试；进程重启后数据丢失。
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    async fn select<F>(&self, predicate: F) -> Vec<Task>
    where
        F: Fn(&Task) -> bool,
    {
        self.tasks
            .read()
            .await
            .values()
            .filter(|task| predicate(task))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> SchedulerResult<Task> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id()) {
            return Err(SchedulerError::database_error(format!(
                "任务 {} 已存在",
                task.id()
            )));
        }
        tasks.insert(task.id(), task.clone());
        debug!(task_id = %task.id(), "任务记录已创建");
        Ok(task.clone())
    }

    async fn find_by_id(&self, id: TaskId) -> SchedulerResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> SchedulerResult<Vec<Task>> {
        Ok(self.select(|_| true).await)
    }

    async fn update(&self, task: &Task) -> SchedulerResult<Task> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id()) {
            Some(stored) if stored.status() != task.status() => Err(
                SchedulerError::invalid_transition(stored.status(), task.status()),
            ),
            Some(stored) => {
                *stored = task.clone();
                Ok(task.clone())
            }
            None => Err(SchedulerError::task_not_found(task.id())),
        }
    }

    async fn delete(&self, id: TaskId) -> SchedulerResult<bool> {
        let removed = self.tasks.write().await.remove(&id).is_some();
        if removed {
            info!(task_id = %id, "任务记录已删除");
        }
        Ok(removed)
    }

    async fn find_by_status(&self, status: TaskStatus) -> SchedulerResult<Vec<Task>> {
        Ok(self.select(|task| task.status() == status).await)
    }

    async fn find_by_priority_at_least(&self, priority: i32) -> SchedulerResult<Vec<Task>> {
        Ok(self.select(|task| task.priority() >= priority).await)
    }

    async fn find_by_status_ordered(&self, status: TaskStatus) -> SchedulerResult<Vec<Task>> {
        let mut tasks = self.select(|task| task.status() == status).await;
        sort_by_dispatch_order(&mut tasks);
        Ok(tasks)
    }

    async fn find_due_before(&self, due_date: DateTime<Utc>) -> SchedulerResult<Vec<Task>> {
        Ok(self
            .select(|task| task.due_date().is_some_and(|due| due < due_date))
            .await)
    }

    async fn find_by_status_and_priority(
        &self,
        status: TaskStatus,
        priority: i32,
    ) -> SchedulerResult<Vec<Task>> {
        Ok(self
            .select(|task| task.status() == status && task.priority() == priority)
            .await)
    }

    async fn find_high_priority_tasks(
        &self,
        status: TaskStatus,
        min_priority: i32,
    ) -> SchedulerResult<Vec<Task>> {
        let mut tasks = self
            .select(|task| task.status() == status && task.priority() >= min_priority)
            .await;
        sort_by_dispatch_order(&mut tasks);
        Ok(tasks)
    }

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> SchedulerResult<StatusChange> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| SchedulerError::task_not_found(id))?;
        let from = task.status();
        task.transition_to(status)?;
        debug!(task_id = %id, from = %from, to = %status, "任务状态已更新");
        Ok(StatusChange {
            from,
            task: task.clone(),
        })
    }

    async fn count_by_status(&self) -> SchedulerResult<HashMap<TaskStatus, u64>> {
        let tasks = self.tasks.read().await;
        let mut counts = HashMap::new();
        for task in tasks.values() {
            *counts.entry(task.status()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn find_stuck_tasks(&self, cutoff: DateTime<Utc>) -> SchedulerResult<Vec<Task>> {
        Ok(self
            .select(|task| task.status() == TaskStatus::Processing && task.updated_at() < cutoff)
            .await)
    }
}
