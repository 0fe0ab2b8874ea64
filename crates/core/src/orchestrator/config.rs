//! Queue runner configuration.

use serde::{Deserialize, Serialize};

use crate::queue::MAX_ROUNDS;
use crate::status::DEFAULT_LOG_CAPACITY;

/// Pacing and limits for the queue runner.
///
/// All pauses are in milliseconds. Tests set them to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Upper bound for the rounds requested by a run.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Pause between two processed queue entries.
    #[serde(default = "default_inter_task_pause")]
    pub inter_task_pause_ms: u64,

    /// Pause after browser setup and after navigation.
    #[serde(default = "default_setup_pause")]
    pub setup_pause_ms: u64,

    /// Pause after a session is released.
    #[serde(default = "default_release_pause")]
    pub release_pause_ms: u64,

    /// Randomized pause between soft steps.
    #[serde(default = "default_step_delay_min")]
    pub step_delay_min_ms: u64,
    #[serde(default = "default_step_delay_max")]
    pub step_delay_max_ms: u64,

    /// Randomized pause between the two feed scrolls.
    #[serde(default = "default_browse_delay_min")]
    pub browse_delay_min_ms: u64,
    #[serde(default = "default_browse_delay_max")]
    pub browse_delay_max_ms: u64,

    /// Operator log lines kept in the status store.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_max_rounds() -> u32 {
    MAX_ROUNDS
}

fn default_inter_task_pause() -> u64 {
    5000
}

fn default_setup_pause() -> u64 {
    3000
}

fn default_release_pause() -> u64 {
    2000
}

fn default_step_delay_min() -> u64 {
    3000
}

fn default_step_delay_max() -> u64 {
    5000
}

fn default_browse_delay_min() -> u64 {
    2000
}

fn default_browse_delay_max() -> u64 {
    3000
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl RunnerConfig {
    /// No pauses at all. Used by tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            inter_task_pause_ms: 0,
            setup_pause_ms: 0,
            release_pause_ms: 0,
            step_delay_min_ms: 0,
            step_delay_max_ms: 0,
            browse_delay_min_ms: 0,
            browse_delay_max_ms: 0,
            ..Self::default()
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            inter_task_pause_ms: default_inter_task_pause(),
            setup_pause_ms: default_setup_pause(),
            release_pause_ms: default_release_pause(),
            step_delay_min_ms: default_step_delay_min(),
            step_delay_max_ms: default_step_delay_max(),
            browse_delay_min_ms: default_browse_delay_min(),
            browse_delay_max_ms: default_browse_delay_max(),
            log_capacity: default_log_capacity(),
        }
    }
}
