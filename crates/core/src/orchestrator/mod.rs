//! Queue runner: drives the run queue entry by entry.
//!
//! One run at a time. Each entry gets its own browser session through the
//! [`TaskPipeline`](crate::pipeline::TaskPipeline); a stop request drains the
//! queue by skipping whatever is still pending.

mod config;
mod runner;
mod types;

pub use config::RunnerConfig;
pub use runner::{QueueRunner, RunController};
pub use types::{OrchestratorError, RunStarted, RunSummary};
