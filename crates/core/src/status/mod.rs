//! Shared run status: the single source of truth read by the control
//! surface and written by the queue runner.

mod log;
mod store;
mod types;

pub use log::{LogBuffer, LogLevel, DEFAULT_LOG_CAPACITY};
pub use store::{StatusError, StatusStore};
pub use types::{RunState, TaskResult};
