//! Metrics collector for the priority scheduler
//!
//! Thin wrapper over the `metrics` facade. Without an installed recorder every
//! call is a no-op, which keeps the collector usable in tests.

use metrics::{counter, gauge, Counter, Gauge};
use scheduler_domain::TaskStatus;
use tracing::{debug, warn};

/// Metrics collector for queue and lifecycle events
pub struct MetricsCollector {
    tasks_enqueued_total: Counter,
    tasks_dispatched_total: Counter,
    tasks_removed_total: Counter,
    queue_depth: Gauge,
    stuck_tasks: Gauge,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            tasks_enqueued_total: counter!("scheduler_tasks_enqueued_total"),
            tasks_dispatched_total: counter!("scheduler_tasks_dispatched_total"),
            tasks_removed_total: counter!("scheduler_tasks_removed_total"),
            queue_depth: gauge!("scheduler_queue_depth"),
            stuck_tasks: gauge!("scheduler_stuck_tasks"),
        }
    }

    /// Record a task entering the queue
    pub fn record_enqueued(&self, queue_depth: usize) {
        self.tasks_enqueued_total.increment(1);
        self.update_queue_depth(queue_depth);
    }

    /// Record a task handed to a consumer
    pub fn record_dispatched(&self, queue_depth: usize) {
        self.tasks_dispatched_total.increment(1);
        self.update_queue_depth(queue_depth);
    }

    /// Record a task removed from the queue without being dispatched
    pub fn record_removed(&self, queue_depth: usize) {
        self.tasks_removed_total.increment(1);
        self.update_queue_depth(queue_depth);
    }

    pub fn record_transition(&self, from: TaskStatus, to: TaskStatus) {
        counter!(
            "scheduler_task_transitions_total",
            "from" => from.as_str(),
            "to" => to.as_str()
        )
        .increment(1);

        debug!(from = %from, to = %to, "Task status transition recorded");
    }

    pub fn update_queue_depth(&self, depth: usize) {
        self.queue_depth.set(depth as f64);
    }

    pub fn update_stuck_tasks(&self, count: usize) {
        self.stuck_tasks.set(count as f64);
        if count > 0 {
            warn!(stuck_tasks = count, "Stuck tasks detected");
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
