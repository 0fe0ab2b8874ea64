//! The fixed per-entry step sequence.
//!
//! A [`TaskPipeline`] runs the eleven [`PipelineStep`]s against one browser
//! session, polling for cancellation at five checkpoints and always
//! releasing the session it opened.

mod executor;
mod pacing;
mod types;

pub use executor::{PipelineReport, TaskPipeline};
pub(crate) use pacing::{jitter, pause_between};
pub use types::{FailurePolicy, PipelineOutcome, PipelineStep, StepOutcome};
