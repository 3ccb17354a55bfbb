pub mod api_observability;
pub mod app_config;
pub mod scheduler_monitor;

pub use api_observability::*;
pub use app_config::*;
pub use scheduler_monitor::*;
