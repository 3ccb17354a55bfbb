//! 内存优先级调度队列
//!
//! 保存尚未派发的任务，按 [`DispatchKey`] 排序：优先级降序，截止时间升序（无截止时间排最后），
//! 其余相同时按入队顺序先进先出。队列只是暂存区而不是记录系统，进程重启后内容丢失。
//!
//! 队列中应当只放 PENDING 任务，这是调用方约定，队列本身不做校验。

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use scheduler_domain::{DispatchKey, DuplicatePolicy, Task, TaskId};
use scheduler_errors::{SchedulerError, SchedulerResult};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct QueueState {
    entries: BTreeMap<DispatchKey, Task>,
    /// 任务ID -> (入队序号 -> 排序键)
    index: HashMap<TaskId, BTreeMap<u64, DispatchKey>>,
    next_sequence: u64,
}

impl QueueState {
    fn insert(&mut self, task: Task) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let key = DispatchKey::for_task(&task, sequence);
        self.index
            .entry(task.id())
            .or_default()
            .insert(sequence, key);
        self.entries.insert(key, task);
    }

    fn remove_key(&mut self, key: &DispatchKey) -> Option<Task> {
        let task = self.entries.remove(key)?;
        if let Some(keys) = self.index.get_mut(&task.id()) {
            keys.remove(&key.sequence);
            if keys.is_empty() {
                self.index.remove(&task.id());
            }
        }
        Some(task)
    }

    /// 移除该ID最早入队的条目
    fn remove_earliest(&mut self, id: TaskId) -> Option<Task> {
        let key = self
            .index
            .get(&id)
            .and_then(|keys| keys.values().next().copied())?;
        self.remove_key(&key)
    }

    fn remove_all(&mut self, id: TaskId) -> usize {
        let Some(keys) = self.index.remove(&id) else {
            return 0;
        };
        for key in keys.values() {
            self.entries.remove(key);
        }
        keys.len()
    }
}

/// 优先级调度器
///
/// 所有操作都在同一把互斥锁内完成，两个并发的 [`get_next_task`](Self::get_next_task)
/// 不会取到同一个条目。
#[derive(Debug, Default)]
pub struct PriorityScheduler {
    state: Mutex<QueueState>,
    policy: DuplicatePolicy,
}

impl PriorityScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // 状态只在所有可能失败的操作之后才被修改，中毒的锁内数据仍然一致
        self.state.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("调度队列锁已中毒，继续使用内部状态");
            poisoned.into_inner()
        })
    }

    /// 按当前重复策略入队
    pub fn add_task(&self, task: Task) -> SchedulerResult<()> {
        let mut state = self.lock();
        match self.policy {
            DuplicatePolicy::Allow => {}
            DuplicatePolicy::Reject => {
                if state.index.contains_key(&task.id()) {
                    return Err(SchedulerError::duplicate_task(task.id()));
                }
            }
            DuplicatePolicy::Replace => {
                let replaced = state.remove_all(task.id());
                if replaced > 0 {
                    debug!(task_id = %task.id(), replaced, "替换队列中已有的任务条目");
                }
            }
        }

        debug!(
            task_id = %task.id(),
            priority = task.priority(),
            "任务入队"
        );
        state.insert(task);
        Ok(())
    }

    /// 查看下一个将被取出的任务，不移除
    pub fn peek_next_task(&self) -> Option<Task> {
        self.lock()
            .entries
            .first_key_value()
            .map(|(_, task)| task.clone())
    }

    /// 取出并移除排在最前的任务
    pub fn get_next_task(&self) -> Option<Task> {
        let mut state = self.lock();
        let key = *state.entries.first_key_value()?.0;
        state.remove_key(&key)
    }

    /// 按调度顺序排列的快照
    pub fn get_all_tasks(&self) -> Vec<Task> {
        self.lock().entries.values().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// 清空队列，不影响持久化的任务记录
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.index.clear();
    }

    /// 按任务ID移除一个条目；同一ID有多个条目时移除最早入队的那个
    pub fn remove_task(&self, task: &Task) -> bool {
        self.remove_task_by_id(task.id()).is_some()
    }

    pub fn remove_task_by_id(&self, id: TaskId) -> Option<Task> {
        self.lock().remove_earliest(id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.lock().index.contains_key(&id)
    }
}
