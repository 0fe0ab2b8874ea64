//! Synchronized run status store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::log::{format_line, LogLevel, DEFAULT_LOG_CAPACITY};
use super::types::{RunState, TaskResult};
use crate::pipeline::{PipelineStep, StepOutcome};
use crate::queue::{EntryStatus, QueueEntry};

/// Errors from status mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    /// A run is active; the state cannot be reset underneath it.
    #[error("Cannot reset while a run is in progress")]
    RunInProgress,

    /// A run is already active.
    #[error("Bot is already running")]
    AlreadyRunning,
}

/// Owner of the [`RunState`].
///
/// `running` and `stop_requested` live in atomics so the pipeline can poll
/// for cancellation without taking the lock. Every other field sits behind
/// a short-lived lock that is never held across an await point.
#[derive(Debug)]
pub struct StatusStore {
    running: AtomicBool,
    stop_requested: AtomicBool,
    state: RwLock<RunState>,
    log_capacity: usize,
}

impl StatusStore {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            state: RwLock::new(RunState::new(log_capacity)),
            log_capacity,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RunState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RunState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> RunState {
        let mut state = self.read().clone();
        state.running = self.is_running();
        state.stop_requested = self.is_stop_requested();
        state
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Claim the runner and reset per-run fields for a fresh queue.
    ///
    /// Fails with [`StatusError::AlreadyRunning`] if another run holds the
    /// claim. The previous run's logs and results are discarded.
    pub fn begin_run(&self, queue: Vec<QueueEntry>, total_rounds: u32) -> Result<(), StatusError> {
        // The claim flips under the state lock so `reset` cannot interleave.
        let mut state = self.write();
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| StatusError::AlreadyRunning)?;
        self.stop_requested.store(false, Ordering::SeqCst);

        *state = RunState::new(self.log_capacity);
        state.queue = queue;
        state.total_rounds = total_rounds;
        Ok(())
    }

    /// Release the run claim and clear the "current" fields.
    pub fn finish_run(&self) {
        let mut state = self.write();
        state.current_profile = None;
        state.current_task = None;
        state.current_round = 0;
        state.current_queue_index = -1;
        self.running.store(false, Ordering::SeqCst);
    }

    /// Set the stop flag. Takes effect at the next checkpoint.
    ///
    /// Accepted when idle too; the flag is cleared by the next run or reset.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.log(
            LogLevel::Warning,
            "STOP REQUESTED - Will stop after current task completes",
        );
    }

    /// Return to idle defaults. Rejected while a run is active.
    pub fn reset(&self) -> Result<(), StatusError> {
        let mut state = self.write();
        if self.is_running() {
            return Err(StatusError::RunInProgress);
        }
        *state = RunState::new(self.log_capacity);
        self.stop_requested.store(false, Ordering::SeqCst);
        drop(state);
        tracing::info!("Run status reset");
        Ok(())
    }

    /// Append an operator log line and mirror it to tracing.
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        let message = message.as_ref();
        match level {
            LogLevel::Info | LogLevel::Success => tracing::info!(level = %level, "{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
        self.write().logs.push(format_line(level, message));
    }

    pub fn clear_logs(&self) {
        self.write().logs.clear();
    }

    pub fn set_current_task(&self, task: Option<&str>) {
        self.write().current_task = task.map(str::to_string);
    }

    /// Copy of the queue entry at `index`.
    pub fn entry(&self, index: usize) -> Option<QueueEntry> {
        self.read().queue.get(index).cloned()
    }

    /// Mark the entry at `index` running and make it current.
    pub fn start_entry(&self, index: usize) -> Option<QueueEntry> {
        let mut state = self.write();
        let entry = state.queue.get_mut(index)?;
        entry.status = EntryStatus::Running;
        let entry = entry.clone();

        state.current_profile = Some(entry.profile_name.clone());
        state.current_round = entry.round;
        state.current_queue_index = index as i64;
        state.task_results.insert(entry.key(), TaskResult::default());
        Some(entry)
    }

    /// Move the entry at `index` to a terminal status.
    pub fn finish_entry(&self, index: usize, status: EntryStatus) {
        let mut state = self.write();
        let Some(entry) = state.queue.get_mut(index) else {
            return;
        };
        entry.status = status;
        let key = entry.key();
        match status {
            EntryStatus::Completed => state.completed.push(key),
            EntryStatus::Failed => state.failed.push(key),
            _ => {}
        }
    }

    /// Mark every pending entry from `from` onwards skipped. Returns how many.
    pub fn skip_pending_from(&self, from: usize) -> usize {
        let mut state = self.write();
        let mut skipped = 0;
        for entry in state.queue.iter_mut().skip(from) {
            if entry.status == EntryStatus::Pending {
                entry.status = EntryStatus::Skipped;
                skipped += 1;
            }
        }
        skipped
    }

    pub fn record_step(&self, key: &str, step: PipelineStep, outcome: StepOutcome) {
        self.write()
            .task_results
            .entry(key.to_string())
            .or_default()
            .steps
            .insert(step, outcome);
    }

    pub fn record_error(&self, key: &str, error: impl Into<String>) {
        self.write()
            .task_results
            .entry(key.to_string())
            .or_default()
            .error = Some(error.into());
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
