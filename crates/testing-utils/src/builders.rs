//! Test data builders for creating test entities
//!
//! Builders start from a pending task with sensible defaults; any field,
//! including the otherwise private id, status and timestamps, can be overridden.

use chrono::{DateTime, Utc};
use scheduler_domain::{Task, TaskId, TaskRecord, TaskStatus};

/// Builder for creating test Task entities
pub struct TaskBuilder {
    record: TaskRecord,
}

impl TaskBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            record: TaskRecord {
                id: TaskId::new(),
                name: "test_task".to_string(),
                description: "test task".to_string(),
                due_date: None,
                priority: 0,
                status: TaskStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: TaskId) -> Self {
        self.record.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.record.name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.record.description = description.to_string();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.record.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.record.due_date = Some(due_date);
        self
    }

    pub fn without_due_date(mut self) -> Self {
        self.record.due_date = None;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.record.status = status;
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.record.updated_at = updated_at;
        self
    }

    pub fn processing(self) -> Self {
        self.with_status(TaskStatus::Processing)
    }

    pub fn done(self) -> Self {
        self.with_status(TaskStatus::Done)
    }

    pub fn build(self) -> Task {
        Task::from(self.record)
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}
