//! Sequential queue runner.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::config::RunnerConfig;
use super::types::{OrchestratorError, RunStarted, RunSummary};
use crate::driver::AutomationDriver;
use crate::pipeline::TaskPipeline;
use crate::profile::{Profile, ProfileStore};
use crate::queue::{build_queue, clamp_rounds, EntryStatus};
use crate::status::{LogLevel, StatusStore};

const BANNER: &str = "============================================================";

/// Object-safe handle the control surface uses to launch runs.
pub trait RunController: Send + Sync {
    /// Validate and claim a run, then process it in the background.
    fn start(&self, profiles: Vec<String>, rounds: i64) -> Result<RunStarted, OrchestratorError>;

    /// Status store the run reports into.
    fn status(&self) -> &Arc<StatusStore>;
}

/// Drives the queue: one entry at a time, one session per entry.
pub struct QueueRunner<D: AutomationDriver + 'static> {
    config: RunnerConfig,
    profiles: Arc<dyn ProfileStore>,
    status: Arc<StatusStore>,
    pipeline: TaskPipeline<D>,
}

impl<D: AutomationDriver + 'static> Clone for QueueRunner<D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            profiles: Arc::clone(&self.profiles),
            status: Arc::clone(&self.status),
            pipeline: self.pipeline.clone(),
        }
    }
}

impl<D: AutomationDriver + 'static> QueueRunner<D> {
    pub fn new(
        config: RunnerConfig,
        driver: Arc<D>,
        profiles: Arc<dyn ProfileStore>,
        status: Arc<StatusStore>,
    ) -> Self {
        let pipeline = TaskPipeline::new(driver, Arc::clone(&status), config.clone());
        Self {
            config,
            profiles,
            status,
            pipeline,
        }
    }

    /// Claim the runner and install a fresh queue.
    fn prepare(&self, selected: &[String], rounds: i64) -> Result<RunStarted, OrchestratorError> {
        if selected.is_empty() {
            return Err(OrchestratorError::NoProfilesSelected);
        }
        let rounds = clamp_rounds(rounds, self.config.max_rounds);
        let queue = build_queue(selected, rounds);
        let started = RunStarted {
            total_tasks: queue.len(),
            rounds,
            profiles: selected.len(),
        };
        self.status.begin_run(queue, rounds)?;
        Ok(started)
    }

    /// Start a run in the background. Returns once the run is claimed.
    pub fn start(&self, selected: Vec<String>, rounds: i64) -> Result<RunStarted, OrchestratorError> {
        let started = self.prepare(&selected, rounds)?;
        info!(
            "Starting run: {} profile(s) x {} round(s)",
            started.profiles, started.rounds
        );

        let runner = self.clone();
        tokio::spawn(async move {
            runner.process_queue(started.profiles).await;
        });
        Ok(started)
    }

    /// Run to completion on the current task.
    pub async fn run(&self, selected: Vec<String>, rounds: i64) -> Result<RunSummary, OrchestratorError> {
        let started = self.prepare(&selected, rounds)?;
        Ok(self.process_queue(started.profiles).await)
    }

    fn lookup(&self) -> HashMap<String, Profile> {
        match self.profiles.lookup_by_name() {
            Ok(lookup) => lookup,
            Err(e) => {
                error!("Profile lookup failed: {}", e);
                self.status
                    .log(LogLevel::Error, format!("Failed to load profiles: {}", e));
                HashMap::new()
            }
        }
    }

    async fn process_queue(&self, profile_count: usize) -> RunSummary {
        let _claim = RunClaim(&self.status);
        let state = self.status.snapshot();
        let queue = state.queue;
        let total = queue.len();
        let rounds = state.total_rounds;

        self.status.log(LogLevel::Info, BANNER);
        self.status.log(
            LogLevel::Info,
            format!(
                "STARTING QUEUE: {} profile(s) x {} round(s) = {} tasks",
                profile_count, rounds, total
            ),
        );
        self.status.log(LogLevel::Info, BANNER);

        let lookup = self.lookup();

        for (index, entry) in queue.iter().enumerate() {
            if self.status.is_stop_requested() {
                let skipped = self.status.skip_pending_from(index);
                self.status.log(
                    LogLevel::Warning,
                    format!("Queue stopped - {} remaining task(s) skipped", skipped),
                );
                break;
            }

            let Some(profile) = lookup.get(&entry.profile_name) else {
                self.status.log(
                    LogLevel::Warning,
                    format!("Profile '{}' not found - skipping", entry.profile_name),
                );
                self.status.finish_entry(index, EntryStatus::Skipped);
                continue;
            };

            self.status.log(
                LogLevel::Info,
                format!(
                    "TASK {}/{}: {} - Round {}/{}",
                    index + 1,
                    total,
                    entry.profile_name,
                    entry.round,
                    rounds
                ),
            );
            self.status.start_entry(index);

            let status = Arc::clone(&self.status);
            let report = self
                .pipeline
                .execute(profile, entry.round, move || status.is_stop_requested())
                .await;
            self.status
                .finish_entry(index, report.outcome.entry_status());

            let is_last = index + 1 == total;
            if !is_last && !self.status.is_stop_requested() && self.config.inter_task_pause_ms > 0 {
                self.status.log(
                    LogLevel::Info,
                    format!(
                        "Waiting {} seconds before next task...",
                        self.config.inter_task_pause_ms / 1000
                    ),
                );
                tokio::time::sleep(Duration::from_millis(self.config.inter_task_pause_ms)).await;
            }
        }

        self.summarize()
    }

    /// Tally the queue and write the closing log block.
    fn summarize(&self) -> RunSummary {
        let state = self.status.snapshot();
        let summary = RunSummary {
            total: state.queue.len(),
            completed: state.count(EntryStatus::Completed),
            failed: state.count(EntryStatus::Failed),
            skipped: state.count(EntryStatus::Skipped),
            stopped: state.stop_requested,
        };

        let headline = if summary.stopped {
            "QUEUE STOPPED"
        } else {
            "QUEUE COMPLETED!"
        };
        self.status.log(LogLevel::Info, BANNER);
        self.status.log(LogLevel::Success, headline);
        self.status
            .log(LogLevel::Info, format!("Total Tasks: {}", summary.total));
        self.status.log(
            LogLevel::Info,
            format!(
                "Completed: {} | Failed: {} | Skipped: {}",
                summary.completed, summary.failed, summary.skipped
            ),
        );
        self.status.log(LogLevel::Info, BANNER);
        info!(
            "Run finished: {} completed, {} failed, {} skipped",
            summary.completed, summary.failed, summary.skipped
        );
        summary
    }
}

/// Releases the run claim when queue processing ends, unwinding included.
struct RunClaim<'a>(&'a StatusStore);

impl Drop for RunClaim<'_> {
    fn drop(&mut self) {
        self.0.finish_run();
    }
}

impl<D: AutomationDriver + 'static> RunController for QueueRunner<D> {
    fn start(&self, profiles: Vec<String>, rounds: i64) -> Result<RunStarted, OrchestratorError> {
        QueueRunner::start(self, profiles, rounds)
    }

    fn status(&self) -> &Arc<StatusStore> {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineStep;
    use crate::profile::InMemoryProfileStore;
    use crate::testing::{fixtures, MockDriver};

    fn runner(
        driver: &Arc<MockDriver>,
        profiles: Vec<Profile>,
    ) -> (QueueRunner<MockDriver>, Arc<StatusStore>) {
        let status = Arc::new(StatusStore::default());
        let store = Arc::new(InMemoryProfileStore::with_profiles(profiles));
        let runner = QueueRunner::new(
            RunnerConfig::immediate(),
            Arc::clone(driver),
            store,
            Arc::clone(&status),
        );
        (runner, status)
    }

    #[tokio::test]
    async fn test_empty_selection_rejected() {
        let driver = Arc::new(MockDriver::new());
        let (runner, status) = runner(&driver, fixtures::profiles(&["alice"]));

        let result = runner.run(Vec::new(), 1).await;
        assert_eq!(result, Err(OrchestratorError::NoProfilesSelected));
        assert!(!status.is_running());
    }

    #[tokio::test]
    async fn test_rounds_are_clamped() {
        let driver = Arc::new(MockDriver::new());
        let (runner, status) = runner(&driver, fixtures::profiles(&["alice"]));

        let summary = runner.run(fixtures::names(&["alice"]), 0).await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(status.snapshot().total_rounds, 1);
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_running() {
        let driver = Arc::new(MockDriver::new());
        driver.set_step_delay(Duration::from_millis(20)).await;
        let (runner, status) = runner(&driver, fixtures::profiles(&["alice"]));

        runner.start(fixtures::names(&["alice"]), 1).unwrap();
        assert_eq!(
            runner.start(fixtures::names(&["alice"]), 1),
            Err(OrchestratorError::AlreadyRunning)
        );

        status.request_stop();
        while status.is_running() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_store_failure_skips_everything() {
        struct BrokenStore;
        impl ProfileStore for BrokenStore {
            fn list(&self) -> Result<Vec<Profile>, crate::profile::ProfileError> {
                Err(crate::profile::ProfileError::Storage("disk gone".to_string()))
            }
            fn get(&self, _id: u64) -> Result<Option<Profile>, crate::profile::ProfileError> {
                Ok(None)
            }
            fn create(
                &self,
                _request: crate::profile::CreateProfileRequest,
            ) -> Result<Profile, crate::profile::ProfileError> {
                Err(crate::profile::ProfileError::Storage("read-only".to_string()))
            }
            fn update(
                &self,
                id: u64,
                _request: crate::profile::UpdateProfileRequest,
            ) -> Result<Profile, crate::profile::ProfileError> {
                Err(crate::profile::ProfileError::NotFound(id))
            }
            fn delete(&self, _id: u64) -> Result<bool, crate::profile::ProfileError> {
                Ok(false)
            }
        }

        let driver = Arc::new(MockDriver::new());
        let status = Arc::new(StatusStore::default());
        let runner = QueueRunner::new(
            RunnerConfig::immediate(),
            Arc::clone(&driver),
            Arc::new(BrokenStore),
            Arc::clone(&status),
        );

        let summary = runner
            .run(fixtures::names(&["alice", "bob"]), 2)
            .await
            .unwrap();
        assert_eq!(summary.skipped, 4);
        assert_eq!(driver.opened().await, 0);
        assert!(status
            .snapshot()
            .logs
            .iter()
            .any(|l| l.contains("[ERROR] Failed to load profiles")));
    }

    #[tokio::test]
    async fn test_driver_panic_does_not_wedge_runner() {
        let driver = Arc::new(MockDriver::new());
        driver
            .on_step(PipelineStep::LikePost, || panic!("driver bug"))
            .await;
        let (runner, status) = runner(&driver, fixtures::profiles(&["alice", "bob"]));

        runner.start(fixtures::names(&["alice", "bob"]), 1).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while status.is_running() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("run did not finish");

        let state = status.snapshot();
        let statuses: Vec<_> = state.queue.iter().map(|e| e.status).collect();
        assert_eq!(statuses, vec![EntryStatus::Failed, EntryStatus::Failed]);
        assert_eq!(state.failed, vec!["alice_R1", "bob_R1"]);
        assert_eq!(driver.opened().await, 2);
        assert_eq!(driver.closed().await, 2);
        assert_eq!(status.reset(), Ok(()));
        let again = runner.run(fixtures::names(&["alice"]), 1).await.unwrap();
        assert_eq!(again.failed, 1);
        assert!(!status.is_running());
    }

    #[tokio::test]
    async fn test_controller_exposes_status() {
        let driver = Arc::new(MockDriver::new());
        let (runner, status) = runner(&driver, Vec::new());
        let controller: &dyn RunController = &runner;
        assert!(Arc::ptr_eq(controller.status(), &status));
    }
}
