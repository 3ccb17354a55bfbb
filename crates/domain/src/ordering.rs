//! 调度顺序策略
//!
//! 优先级降序；同优先级按截止时间升序，没有截止时间的任务排在所有有截止时间的任务之后。

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::entities::Task;

/// 截止时间升序，`None` 视为最晚
pub fn compare_due_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 任务比较器：`Less` 表示 `a` 应先于 `b` 被取出
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| compare_due_dates(a.due_date(), b.due_date()))
}

/// 按调度顺序就地排序（稳定排序，相等元素保持原有次序）
pub fn sort_by_dispatch_order(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

/// 调度队列中的排序键
///
/// 在比较器之外追加入队序号，使同优先级、同截止时间的任务按先进先出取出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchKey {
    pub priority: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub sequence: u64,
}

impl DispatchKey {
    pub fn for_task(task: &Task, sequence: u64) -> Self {
        Self {
            priority: task.priority(),
            due_date: task.due_date(),
            sequence,
        }
    }
}

impl Ord for DispatchKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| compare_due_dates(self.due_date, other.due_date))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for DispatchKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
