//! Run state types exposed through the status snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use super::log::LogBuffer;
use crate::pipeline::{PipelineStep, StepOutcome};
use crate::queue::{EntryStatus, QueueEntry};

/// Per-entry step results. Steps render in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    pub steps: BTreeMap<PipelineStep, StepOutcome>,
    /// Set when a hard step aborted the pipeline.
    pub error: Option<String>,
}

impl TaskResult {
    pub fn outcome(&self, step: PipelineStep) -> Option<StepOutcome> {
        self.steps.get(&step).copied()
    }
}

/// Point-in-time view of the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub running: bool,
    pub stop_requested: bool,
    pub current_profile: Option<String>,
    pub current_task: Option<String>,
    pub current_round: u32,
    pub total_rounds: u32,
    pub queue: Vec<QueueEntry>,
    /// Index of the entry being processed, -1 when idle.
    pub current_queue_index: i64,
    /// Keys of completed entries in completion order.
    pub completed: Vec<String>,
    /// Keys of failed entries in failure order.
    pub failed: Vec<String>,
    pub logs: LogBuffer,
    pub task_results: BTreeMap<String, TaskResult>,
}

impl RunState {
    pub(super) fn new(log_capacity: usize) -> Self {
        Self {
            running: false,
            stop_requested: false,
            current_profile: None,
            current_task: None,
            current_round: 0,
            total_rounds: 1,
            queue: Vec::new(),
            current_queue_index: -1,
            completed: Vec::new(),
            failed: Vec::new(),
            logs: LogBuffer::new(log_capacity),
            task_results: BTreeMap::new(),
        }
    }

    /// Number of queue entries currently in `status`.
    pub fn count(&self, status: EntryStatus) -> usize {
        self.queue.iter().filter(|e| e.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_result_renders_steps_in_pipeline_order() {
        let mut result = TaskResult::default();
        result
            .steps
            .insert(PipelineStep::ImagePost, StepOutcome::Failed);
        result
            .steps
            .insert(PipelineStep::BrowserSetup, StepOutcome::Succeeded);
        result
            .steps
            .insert(PipelineStep::Story, StepOutcome::NotApplicable);

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"steps":{"browser_setup":"succeeded","story":"not_applicable","image_post":"failed"},"error":null}"#
        );
    }

    #[test]
    fn test_idle_state_defaults() {
        let state = RunState::new(200);
        assert!(!state.running);
        assert_eq!(state.current_queue_index, -1);
        assert_eq!(state.current_round, 0);
        assert_eq!(state.total_rounds, 1);
        assert!(state.queue.is_empty());
        assert!(state.logs.is_empty());
    }
}
