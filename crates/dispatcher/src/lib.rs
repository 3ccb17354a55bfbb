//! 调度核心
//!
//! - [`PriorityScheduler`]: 内存优先级队列
//! - [`TaskDispatchService`]: 队列与任务仓储之间的派发流程
//! - [`StuckTaskDetector`]: 长时间停留在 PROCESSING 的任务检测

pub mod dispatch_service;
pub mod priority_scheduler;
pub mod stuck_task_detector;

pub use dispatch_service::TaskDispatchService;
pub use priority_scheduler::PriorityScheduler;
pub use stuck_task_detector::{StuckTaskDetector, StuckTaskDetectorConfig};
