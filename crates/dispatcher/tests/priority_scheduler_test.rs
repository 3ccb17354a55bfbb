use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use scheduler_dispatcher::PriorityScheduler;
use scheduler_domain::{compare_due_dates, DuplicatePolicy, SchedulerError, Task, TaskStatus};
use scheduler_testing_utils::{hours_from_now, random_tasks, TaskBuilder};

fn drain(scheduler: &PriorityScheduler) -> Vec<Task> {
    std::iter::from_fn(|| scheduler.get_next_task()).collect()
}

#[test]
fn test_pop_order_by_priority_then_due_date() {
    let scheduler = PriorityScheduler::new();
    let early = TaskBuilder::new()
        .with_name("p3-1h")
        .with_priority(3)
        .with_due_date(hours_from_now(1))
        .build();
    let late = TaskBuilder::new()
        .with_name("p3-2h")
        .with_priority(3)
        .with_due_date(hours_from_now(2))
        .build();
    let urgent = TaskBuilder::new()
        .with_name("p7-5h")
        .with_priority(7)
        .with_due_date(hours_from_now(5))
        .build();

    scheduler.add_task(early).unwrap();
    scheduler.add_task(late).unwrap();
    scheduler.add_task(urgent).unwrap();

    let names: Vec<String> = drain(&scheduler)
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names, vec!["p7-5h", "p3-1h", "p3-2h"]);
}

#[test]
fn test_random_inserts_drain_in_dispatch_order() {
    for _ in 0..20 {
        let scheduler = PriorityScheduler::new();
        for task in random_tasks(64) {
            scheduler.add_task(task).unwrap();
        }

        let drained = drain(&scheduler);
        assert_eq!(drained.len(), 64);
        for pair in drained.windows(2) {
            assert!(pair[0].priority() >= pair[1].priority());
            if pair[0].priority() == pair[1].priority() {
                assert!(compare_due_dates(pair[0].due_date(), pair[1].due_date()).is_le());
            }
        }
    }
}

#[test]
fn test_missing_due_date_sorts_last() {
    let scheduler = PriorityScheduler::new();
    let undated = TaskBuilder::new().with_name("undated").with_priority(2).build();
    let dated = TaskBuilder::new()
        .with_name("dated")
        .with_priority(2)
        .with_due_date(hours_from_now(48))
        .build();
    scheduler.add_task(undated).unwrap();
    scheduler.add_task(dated).unwrap();

    assert_eq!(scheduler.get_next_task().unwrap().name(), "dated");
    assert_eq!(scheduler.get_next_task().unwrap().name(), "undated");
}

#[test]
fn test_equal_keys_are_fifo() {
    let scheduler = PriorityScheduler::new();
    let due = hours_from_now(1);
    for name in ["first", "second", "third"] {
        scheduler
            .add_task(
                TaskBuilder::new()
                    .with_name(name)
                    .with_priority(4)
                    .with_due_date(due)
                    .build(),
            )
            .unwrap();
    }

    let names: Vec<String> = drain(&scheduler)
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[test]
fn test_peek_matches_next_pop() {
    let scheduler = PriorityScheduler::new();
    for task in random_tasks(16) {
        scheduler.add_task(task).unwrap();
    }

    while let Some(peeked) = scheduler.peek_next_task() {
        let size = scheduler.size();
        let popped = scheduler.get_next_task().unwrap();
        assert_eq!(peeked.id(), popped.id());
        assert_eq!(scheduler.size(), size - 1);
    }
}

#[test]
fn test_empty_scheduler_returns_none() {
    let scheduler = PriorityScheduler::new();
    assert!(scheduler.is_empty());
    assert_eq!(scheduler.size(), 0);
    assert!(scheduler.peek_next_task().is_none());
    assert!(scheduler.get_next_task().is_none());
    assert!(scheduler.get_all_tasks().is_empty());
}

#[test]
fn test_size_tracks_adds_pops_removes_and_clear() {
    let scheduler = PriorityScheduler::new();
    let tasks = random_tasks(10);
    for task in &tasks {
        scheduler.add_task(task.clone()).unwrap();
    }
    assert_eq!(scheduler.size(), 10);

    scheduler.get_next_task();
    scheduler.get_next_task();
    assert_eq!(scheduler.size(), 8);

    let still_queued = scheduler.get_all_tasks();
    assert!(scheduler.remove_task(&still_queued[3]));
    assert_eq!(scheduler.size(), 7);

    let absent = TaskBuilder::new().build();
    assert!(!scheduler.remove_task(&absent));
    assert_eq!(scheduler.size(), 7);

    scheduler.clear();
    assert_eq!(scheduler.size(), 0);
    assert!(scheduler.is_empty());
}

#[test]
fn test_remove_middle_task() {
    let scheduler = PriorityScheduler::new();
    let a = TaskBuilder::new().with_name("A").with_priority(5).build();
    let b = TaskBuilder::new().with_name("B").with_priority(5).build();
    let c = TaskBuilder::new().with_name("C").with_priority(1).build();
    scheduler.add_task(a.clone()).unwrap();
    scheduler.add_task(b.clone()).unwrap();
    scheduler.add_task(c.clone()).unwrap();

    assert!(scheduler.remove_task(&b));
    assert_eq!(scheduler.size(), 2);

    let ids: Vec<_> = drain(&scheduler).iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![a.id(), c.id()]);
}

#[test]
fn test_snapshot_is_sorted_and_detached() {
    let scheduler = PriorityScheduler::new();
    for task in random_tasks(12) {
        scheduler.add_task(task).unwrap();
    }

    let mut snapshot = scheduler.get_all_tasks();
    let drained = {
        let copy = PriorityScheduler::new();
        for task in &snapshot {
            copy.add_task(task.clone()).unwrap();
        }
        drain(&copy)
    };
    let snapshot_ids: Vec<_> = snapshot.iter().map(|t| t.id()).collect();
    let drained_ids: Vec<_> = drained.iter().map(|t| t.id()).collect();
    assert_eq!(snapshot_ids, drained_ids);

    snapshot.clear();
    snapshot.push(TaskBuilder::new().build());
    assert_eq!(scheduler.size(), 12);
}

#[test]
fn test_allow_policy_keeps_duplicates() {
    let scheduler = PriorityScheduler::new();
    let task = TaskBuilder::new().with_priority(1).build();
    scheduler.add_task(task.clone()).unwrap();
    scheduler.add_task(task.clone()).unwrap();
    assert_eq!(scheduler.size(), 2);

    assert!(scheduler.remove_task(&task));
    assert!(scheduler.contains(task.id()));
    assert!(scheduler.remove_task(&task));
    assert!(!scheduler.contains(task.id()));
    assert!(!scheduler.remove_task(&task));
}

#[test]
fn test_duplicate_removal_takes_earliest_entry() {
    let scheduler = PriorityScheduler::new();
    let original = TaskBuilder::new().with_name("copy").with_priority(1).build();
    let mut bumped = original.clone();
    bumped.set_priority(9);

    scheduler.add_task(original.clone()).unwrap();
    scheduler.add_task(bumped).unwrap();

    // 最早入队的是低优先级副本，移除后剩下高优先级副本
    assert!(scheduler.remove_task(&original));
    let remaining = scheduler.get_next_task().unwrap();
    assert_eq!(remaining.priority(), 9);
}

#[test]
fn test_reject_policy() {
    let scheduler = PriorityScheduler::with_policy(DuplicatePolicy::Reject);
    let task = TaskBuilder::new().build();
    scheduler.add_task(task.clone()).unwrap();

    let err = scheduler.add_task(task.clone()).unwrap_err();
    assert!(matches!(err, SchedulerError::DuplicateTask { .. }));
    assert_eq!(scheduler.size(), 1);

    scheduler.get_next_task();
    assert!(scheduler.add_task(task).is_ok());
}

#[test]
fn test_replace_policy() {
    let scheduler = PriorityScheduler::with_policy(DuplicatePolicy::Replace);
    let task = TaskBuilder::new().with_priority(1).build();
    scheduler.add_task(task.clone()).unwrap();

    let mut updated = task.clone();
    updated.set_priority(8);
    scheduler.add_task(updated).unwrap();

    assert_eq!(scheduler.size(), 1);
    assert_eq!(scheduler.peek_next_task().unwrap().priority(), 8);
}

#[test]
fn test_scheduler_does_not_validate_status() {
    let scheduler = PriorityScheduler::new();
    let done = TaskBuilder::new().with_status(TaskStatus::Done).build();
    scheduler.add_task(done).unwrap();
    assert_eq!(scheduler.get_next_task().unwrap().status(), TaskStatus::Done);
}

#[test]
fn test_concurrent_consumers_never_share_a_task() {
    let scheduler = Arc::new(PriorityScheduler::new());
    for task in random_tasks(400) {
        scheduler.add_task(task).unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let mut popped = Vec::new();
                while let Some(task) = scheduler.get_next_task() {
                    popped.push(task.id());
                }
                popped
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "task {id} dispatched twice");
        }
    }
    assert_eq!(seen.len(), 400);
    assert!(scheduler.is_empty());
}

#[test]
fn test_concurrent_producers_and_consumers() {
    let scheduler = Arc::new(PriorityScheduler::new());

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                for task in random_tasks(100) {
                    scheduler.add_task(task).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let consumer = {
        let scheduler = Arc::clone(&scheduler);
        thread::spawn(move || drain(&scheduler).len())
    };
    let remaining_after = consumer.join().unwrap() + scheduler.size();
    assert_eq!(remaining_after, 400);
}
