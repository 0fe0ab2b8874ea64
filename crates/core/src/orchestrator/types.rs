//! Types for the queue runner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::StatusError;

/// Errors that can occur when starting a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// The run request named no profiles.
    #[error("No profiles selected")]
    NoProfilesSelected,

    /// A run is already in progress.
    #[error("Bot is already running")]
    AlreadyRunning,
}

impl From<StatusError> for OrchestratorError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::AlreadyRunning | StatusError::RunInProgress => {
                OrchestratorError::AlreadyRunning
            }
        }
    }
}

/// Accepted run request, returned before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStarted {
    /// Number of queue entries (profiles x rounds).
    pub total_tasks: usize,
    /// Rounds after clamping.
    pub rounds: u32,
    pub profiles: usize,
}

/// Final tallies of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Whether a stop request ended the run early.
    pub stopped: bool,
}
