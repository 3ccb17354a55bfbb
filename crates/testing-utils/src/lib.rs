//! # Scheduler Testing Utils
//!
//! Shared testing utilities for the priority scheduler workspace.
//!
//! - **Test Data Builders**: `TaskBuilder` for tasks in any lifecycle state
//! - **Helpers**: time offsets, random task batches and async wait helpers
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! scheduler-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;

pub use builders::*;
pub use helpers::*;
