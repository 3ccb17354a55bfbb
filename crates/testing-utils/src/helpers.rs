//! Test helper utilities and common testing patterns

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use scheduler_domain::Task;
use std::time::Duration;
use tokio::time::sleep;

use crate::builders::TaskBuilder;

/// Point in time `hours` from now; negative values lie in the past
pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
    Utc::now() + ChronoDuration::hours(hours)
}

/// Point in time `minutes` from now
pub fn minutes_from_now(minutes: i64) -> DateTime<Utc> {
    Utc::now() + ChronoDuration::minutes(minutes)
}

/// Build `count` pending tasks with random priorities and, for roughly a
/// third of them, no due date.
pub fn random_tasks(count: usize) -> Vec<Task> {
    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            let builder = TaskBuilder::new()
                .with_name(&format!("task-{i}"))
                .with_priority(rng.random_range(-5..=5));
            if rng.random_range(0..3) == 0 {
                builder.without_due_date().build()
            } else {
                builder
                    .with_due_date(minutes_from_now(rng.random_range(-120..=120)))
                    .build()
            }
        })
        .collect()
}

/// Test environment setup utilities
pub struct TestEnv;

impl TestEnv {
    /// Wait for a condition to be true with timeout
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = std::time::Instant::now();

        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }

        false
    }
}
