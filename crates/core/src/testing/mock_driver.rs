//! Mock automation driver for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::driver::{AutomationDriver, DriverError};
use crate::pipeline::{PipelineStep, StepOutcome};
use crate::profile::Profile;

/// Callback fired when the mock enters a step.
pub type StepHook = Arc<dyn Fn() + Send + Sync>;

/// Session handed out by [`MockDriver`].
#[derive(Debug)]
pub struct MockSession {
    pub id: usize,
    pub profile: String,
}

/// A recorded driver call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub profile: String,
    pub step: PipelineStep,
}

/// Mock implementation of the AutomationDriver trait.
///
/// Every step succeeds unless configured otherwise:
/// - per-step outcomes and errors (errors on hard steps abort the pipeline)
/// - per-profile setup failures and logged-out profiles
/// - hooks that run when a step is entered (e.g. to request a stop)
/// - an artificial per-step delay for observing a run in flight
///
/// # Example
///
/// ```rust,ignore
/// let driver = MockDriver::new();
/// driver.set_logged_out("bob").await;
/// driver.set_outcome(PipelineStep::Story, StepOutcome::NotApplicable).await;
///
/// // ... run the queue ...
///
/// assert_eq!(driver.opened().await, driver.closed().await);
/// ```
#[derive(Default)]
pub struct MockDriver {
    outcomes: Arc<RwLock<HashMap<PipelineStep, StepOutcome>>>,
    errors: Arc<RwLock<HashMap<PipelineStep, String>>>,
    setup_failures: Arc<RwLock<HashSet<String>>>,
    logged_out: Arc<RwLock<HashSet<String>>>,
    hooks: Arc<RwLock<HashMap<PipelineStep, StepHook>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    opened: Arc<RwLock<usize>>,
    closed: Arc<RwLock<usize>>,
    step_delay: Arc<RwLock<Duration>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome reported by a soft step.
    pub async fn set_outcome(&self, step: PipelineStep, outcome: StepOutcome) {
        self.outcomes.write().await.insert(step, outcome);
    }

    /// Make a step return `DriverError::Step(message)`.
    pub async fn set_step_error(&self, step: PipelineStep, message: impl Into<String>) {
        self.errors.write().await.insert(step, message.into());
    }

    /// Make `open_session` fail for this profile name.
    pub async fn fail_setup(&self, profile: impl Into<String>) {
        self.setup_failures.write().await.insert(profile.into());
    }

    /// Make `check_login` fail for this profile name.
    pub async fn set_logged_out(&self, profile: impl Into<String>) {
        self.logged_out.write().await.insert(profile.into());
    }

    /// Run `hook` whenever `step` is entered.
    pub async fn on_step<F>(&self, step: PipelineStep, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.write().await.insert(step, Arc::new(hook));
    }

    /// Sleep this long inside every step.
    pub async fn set_step_delay(&self, delay: Duration) {
        *self.step_delay.write().await = delay;
    }

    /// Sessions successfully opened.
    pub async fn opened(&self) -> usize {
        *self.opened.read().await
    }

    /// Sessions closed.
    pub async fn closed(&self) -> usize {
        *self.closed.read().await
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn was_called(&self, step: PipelineStep) -> bool {
        self.call_count(step).await > 0
    }

    pub async fn call_count(&self, step: PipelineStep) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.step == step)
            .count()
    }

    /// Profiles for which `step` was called, in call order.
    pub async fn profiles_for(&self, step: PipelineStep) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.step == step)
            .map(|c| c.profile.clone())
            .collect()
    }

    /// Record the call, fire hooks, apply the delay.
    async fn enter(&self, profile: &str, step: PipelineStep) {
        self.calls.write().await.push(RecordedCall {
            profile: profile.to_string(),
            step,
        });

        let hook = self.hooks.read().await.get(&step).cloned();
        if let Some(hook) = hook {
            hook();
        }

        let delay = *self.step_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn error_for(&self, step: PipelineStep) -> Option<DriverError> {
        self.errors
            .read()
            .await
            .get(&step)
            .map(|message| DriverError::Step(message.clone()))
    }

    async fn soft_step(
        &self,
        session: &MockSession,
        step: PipelineStep,
    ) -> Result<StepOutcome, DriverError> {
        self.enter(&session.profile, step).await;
        if let Some(err) = self.error_for(step).await {
            return Err(err);
        }
        Ok(self
            .outcomes
            .read()
            .await
            .get(&step)
            .copied()
            .unwrap_or(StepOutcome::Succeeded))
    }
}

#[async_trait]
impl AutomationDriver for MockDriver {
    type Session = MockSession;

    fn name(&self) -> &str {
        "mock"
    }

    async fn open_session(&self, profile: &Profile) -> Result<MockSession, DriverError> {
        self.enter(&profile.name, PipelineStep::BrowserSetup).await;
        if self.setup_failures.read().await.contains(&profile.name) {
            return Err(DriverError::Setup(format!(
                "cannot launch browser for {}",
                profile.name
            )));
        }
        if let Some(err) = self.error_for(PipelineStep::BrowserSetup).await {
            return Err(err);
        }

        let mut opened = self.opened.write().await;
        *opened += 1;
        Ok(MockSession {
            id: *opened,
            profile: profile.name.clone(),
        })
    }

    async fn close_session(&self, _session: MockSession) -> Result<(), DriverError> {
        *self.closed.write().await += 1;
        Ok(())
    }

    async fn navigate_home(&self, session: &mut MockSession) -> Result<(), DriverError> {
        self.enter(&session.profile, PipelineStep::Navigation).await;
        match self.error_for(PipelineStep::Navigation).await {
            Some(DriverError::Step(message)) => Err(DriverError::Navigation(message)),
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn check_login(&self, session: &mut MockSession) -> Result<(), DriverError> {
        self.enter(&session.profile, PipelineStep::LoginCheck).await;
        if self.logged_out.read().await.contains(&session.profile) {
            return Err(DriverError::NotLoggedIn);
        }
        match self.error_for(PipelineStep::LoginCheck).await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn verify_feed_access(
        &self,
        session: &mut MockSession,
    ) -> Result<StepOutcome, DriverError> {
        self.soft_step(session, PipelineStep::FeedAccess).await
    }

    async fn browse_feed(&self, session: &mut MockSession) -> Result<(), DriverError> {
        self.enter(&session.profile, PipelineStep::BrowseFeed).await;
        match self.error_for(PipelineStep::BrowseFeed).await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn visit_first_post_author(
        &self,
        session: &mut MockSession,
    ) -> Result<StepOutcome, DriverError> {
        self.soft_step(session, PipelineStep::VisitProfile).await
    }

    async fn return_home(&self, session: &mut MockSession) -> Result<StepOutcome, DriverError> {
        self.soft_step(session, PipelineStep::ReturnHome).await
    }

    async fn watch_first_story(
        &self,
        session: &mut MockSession,
    ) -> Result<StepOutcome, DriverError> {
        self.soft_step(session, PipelineStep::Story).await
    }

    async fn like_first_post(&self, session: &mut MockSession) -> Result<StepOutcome, DriverError> {
        self.soft_step(session, PipelineStep::LikePost).await
    }

    async fn comment_on_first_post(
        &self,
        session: &mut MockSession,
    ) -> Result<StepOutcome, DriverError> {
        self.soft_step(session, PipelineStep::Comment).await
    }

    async fn create_image_post(
        &self,
        session: &mut MockSession,
    ) -> Result<StepOutcome, DriverError> {
        self.soft_step(session, PipelineStep::ImagePost).await
    }
}
