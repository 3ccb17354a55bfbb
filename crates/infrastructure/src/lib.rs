pub mod in_memory_task_repository;
pub mod observability;

pub use in_memory_task_repository::InMemoryTaskRepository;
pub use observability::*;
