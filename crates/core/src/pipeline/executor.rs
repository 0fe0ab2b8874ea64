//! Per-entry pipeline execution.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error};

use super::pacing::pause_between;
use super::types::{PipelineOutcome, PipelineStep, StepOutcome};
use crate::driver::{AutomationDriver, DriverError};
use crate::orchestrator::RunnerConfig;
use crate::profile::Profile;
use crate::status::{LogLevel, StatusStore, TaskResult};

/// Result of one pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub outcome: PipelineOutcome,
    pub result: TaskResult,
}

/// Why the step sequence stopped early.
enum Abort {
    Cancelled(PipelineStep),
    Failed(DriverError),
}

/// Runs the step sequence for one (profile, round) entry.
pub struct TaskPipeline<D: AutomationDriver> {
    driver: Arc<D>,
    status: Arc<StatusStore>,
    pacing: RunnerConfig,
}

impl<D: AutomationDriver> Clone for TaskPipeline<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            status: Arc::clone(&self.status),
            pacing: self.pacing.clone(),
        }
    }
}

impl<D: AutomationDriver> TaskPipeline<D> {
    pub fn new(driver: Arc<D>, status: Arc<StatusStore>, pacing: RunnerConfig) -> Self {
        Self {
            driver,
            status,
            pacing,
        }
    }

    /// Execute every step for `profile`.
    ///
    /// `should_stop` is polled before steps 1, 2, 5, 8 and 9. A session
    /// opened by step 1 is released on every exit path. Step results are
    /// written to the status store as they happen under the key
    /// `<profile>_R<round>`.
    pub async fn execute<F>(&self, profile: &Profile, round: u32, should_stop: F) -> PipelineReport
    where
        F: Fn() -> bool + Send + Sync,
    {
        let key = format!("{}_R{}", profile.name, round);
        let mut result = TaskResult::default();
        self.status.log(
            LogLevel::Info,
            format!("Starting tasks for: {} (Round {})", profile.name, round),
        );

        if should_stop() {
            return self.cancelled(profile, round, PipelineStep::BrowserSetup, result);
        }

        self.enter(PipelineStep::BrowserSetup);
        let opened = AssertUnwindSafe(self.driver.open_session(profile))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(crashed(panic)));
        let mut session = match opened {
            Ok(session) => session,
            Err(e) => return self.failed(&key, profile, round, e, result),
        };
        self.passed(&key, &mut result, PipelineStep::BrowserSetup);
        self.pause(self.pacing.setup_pause_ms).await;

        let flow = AssertUnwindSafe(self.run_steps(&mut session, &key, &mut result, &should_stop))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Abort::Failed(crashed(panic))));
        self.release(session).await;

        match flow {
            Ok(()) => {
                self.status.log(
                    LogLevel::Success,
                    format!("ALL TASKS COMPLETED for {} (Round {})", profile.name, round),
                );
                PipelineReport {
                    outcome: PipelineOutcome::Completed,
                    result,
                }
            }
            Err(Abort::Cancelled(step)) => self.cancelled(profile, round, step, result),
            Err(Abort::Failed(e)) => self.failed(&key, profile, round, e, result),
        }
    }

    /// Steps 2 through 11, with a live session.
    async fn run_steps<F>(
        &self,
        session: &mut D::Session,
        key: &str,
        result: &mut TaskResult,
        should_stop: &F,
    ) -> Result<(), Abort>
    where
        F: Fn() -> bool + Send + Sync,
    {
        checkpoint(PipelineStep::Navigation, should_stop)?;
        self.enter(PipelineStep::Navigation);
        self.driver
            .navigate_home(session)
            .await
            .map_err(Abort::Failed)?;
        self.passed(key, result, PipelineStep::Navigation);
        self.pause(self.pacing.setup_pause_ms).await;

        self.enter(PipelineStep::LoginCheck);
        self.driver
            .check_login(session)
            .await
            .map_err(Abort::Failed)?;
        self.passed(key, result, PipelineStep::LoginCheck);

        self.enter(PipelineStep::FeedAccess);
        let outcome = self.driver.verify_feed_access(session).await;
        self.conclude(key, result, PipelineStep::FeedAccess, outcome);

        checkpoint(PipelineStep::BrowseFeed, should_stop)?;
        self.enter(PipelineStep::BrowseFeed);
        for pass in 0..2 {
            if pass > 0 {
                pause_between(self.pacing.browse_delay_min_ms, self.pacing.browse_delay_max_ms)
                    .await;
            }
            if let Err(e) = self.driver.browse_feed(session).await {
                debug!("Feed scroll failed: {}", e);
            }
        }
        self.passed(key, result, PipelineStep::BrowseFeed);

        self.enter(PipelineStep::VisitProfile);
        let outcome = self.driver.visit_first_post_author(session).await;
        self.conclude(key, result, PipelineStep::VisitProfile, outcome);
        self.step_pause().await;

        self.enter(PipelineStep::ReturnHome);
        let outcome = self.driver.return_home(session).await;
        self.conclude(key, result, PipelineStep::ReturnHome, outcome);
        self.step_pause().await;

        checkpoint(PipelineStep::Story, should_stop)?;
        self.enter(PipelineStep::Story);
        let outcome = self.driver.watch_first_story(session).await;
        self.conclude(key, result, PipelineStep::Story, outcome);
        self.step_pause().await;

        checkpoint(PipelineStep::LikePost, should_stop)?;
        self.enter(PipelineStep::LikePost);
        let outcome = self.driver.like_first_post(session).await;
        self.conclude(key, result, PipelineStep::LikePost, outcome);
        self.step_pause().await;

        self.enter(PipelineStep::Comment);
        let outcome = self.driver.comment_on_first_post(session).await;
        self.conclude(key, result, PipelineStep::Comment, outcome);
        self.step_pause().await;

        self.enter(PipelineStep::ImagePost);
        let outcome = self.driver.create_image_post(session).await;
        self.conclude(key, result, PipelineStep::ImagePost, outcome);

        Ok(())
    }

    fn enter(&self, step: PipelineStep) {
        self.status.set_current_task(Some(step.task_label()));
        self.status
            .log(LogLevel::Info, format!("{}...", step.task_label()));
    }

    /// Record a step that has no soft outcome and log its end.
    fn passed(&self, key: &str, result: &mut TaskResult, step: PipelineStep) {
        self.status
            .log(LogLevel::Success, format!("{}: SUCCESS", step.display_name()));
        self.record(key, result, step, StepOutcome::Succeeded);
    }

    fn record(&self, key: &str, result: &mut TaskResult, step: PipelineStep, outcome: StepOutcome) {
        result.steps.insert(step, outcome);
        self.status.record_step(key, step, outcome);
    }

    /// Record a soft step; driver errors are downgraded to `Failed`.
    fn conclude(
        &self,
        key: &str,
        result: &mut TaskResult,
        step: PipelineStep,
        outcome: Result<StepOutcome, DriverError>,
    ) {
        let name = step.display_name();
        let outcome = match outcome {
            Ok(StepOutcome::Succeeded) => {
                self.status
                    .log(LogLevel::Success, format!("{}: SUCCESS", name));
                StepOutcome::Succeeded
            }
            Ok(StepOutcome::NotApplicable) => {
                self.status
                    .log(LogLevel::Info, format!("{}: nothing to do", name));
                StepOutcome::NotApplicable
            }
            Ok(StepOutcome::Failed) => {
                self.status
                    .log(LogLevel::Warning, format!("{}: FAILED", name));
                StepOutcome::Failed
            }
            Err(e) => {
                self.status
                    .log(LogLevel::Warning, format!("{}: FAILED ({})", name, e));
                StepOutcome::Failed
            }
        };
        self.record(key, result, step, outcome);
    }

    async fn release(&self, session: D::Session) {
        self.status.set_current_task(Some("Closing browser"));
        self.status.log(LogLevel::Info, "Closing browser...");
        let closed = AssertUnwindSafe(self.driver.close_session(session))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(crashed(panic)));
        if let Err(e) = closed {
            self.status
                .log(LogLevel::Warning, format!("Error closing browser: {}", e));
        }
        self.pause(self.pacing.release_pause_ms).await;
    }

    fn failed(
        &self,
        key: &str,
        profile: &Profile,
        round: u32,
        error: DriverError,
        mut result: TaskResult,
    ) -> PipelineReport {
        let error = error.to_string();
        self.status.log(
            LogLevel::Error,
            format!("ERROR for {} (Round {}): {}", profile.name, round, error),
        );
        self.status.record_error(key, error.clone());
        result.error = Some(error.clone());
        PipelineReport {
            outcome: PipelineOutcome::Failed { error },
            result,
        }
    }

    fn cancelled(
        &self,
        profile: &Profile,
        round: u32,
        before: PipelineStep,
        result: TaskResult,
    ) -> PipelineReport {
        self.status.log(
            LogLevel::Warning,
            format!(
                "Stop requested - skipping {} (Round {}) before {}",
                profile.name, round, before
            ),
        );
        PipelineReport {
            outcome: PipelineOutcome::Cancelled,
            result,
        }
    }

    async fn pause(&self, ms: u64) {
        pause_between(ms, ms).await;
    }

    async fn step_pause(&self) {
        pause_between(self.pacing.step_delay_min_ms, self.pacing.step_delay_max_ms).await;
    }
}

/// Turn a caught driver panic into an entry failure.
fn crashed(panic: Box<dyn Any + Send>) -> DriverError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!("Automation driver panicked: {}", message);
    DriverError::Panicked(message)
}

fn checkpoint<F>(next: PipelineStep, should_stop: &F) -> Result<(), Abort>
where
    F: Fn() -> bool,
{
    debug_assert!(next.is_checkpoint());
    if should_stop() {
        Err(Abort::Cancelled(next))
    } else {
        Ok(())
    }
}
