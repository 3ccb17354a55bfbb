pub mod entities;
pub mod ordering;
pub mod repositories;
pub mod task_status;
pub mod value_objects;

pub use entities::*;
pub use ordering::*;
pub use repositories::*;
pub use scheduler_errors::{SchedulerError, SchedulerResult};
pub use task_status::*;
pub use value_objects::*;
