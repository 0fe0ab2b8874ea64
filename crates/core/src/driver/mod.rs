//! Browser automation abstraction.
//!
//! The pipeline only talks to an [`AutomationDriver`]; how a step finds and
//! activates page elements is the driver's business. [`WebDriverAutomation`]
//! drives a real browser over the W3C WebDriver protocol.

mod images;
mod webdriver;

use async_trait::async_trait;
use thiserror::Error;

use crate::pipeline::StepOutcome;
use crate::profile::Profile;

pub use images::{FetchedImage, ImageFetchError, ImageFetcher, StockImageFetcher};
pub use webdriver::{Locator, WebDriverAutomation, WebDriverClient, WebDriverError};

/// Errors raised by driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The browser session could not be created.
    #[error("Browser setup failed: {0}")]
    Setup(String),

    /// The target site could not be reached.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The profile has no authenticated session on the target.
    #[error("Not logged in - please login to this profile first")]
    NotLoggedIn,

    /// A page interaction failed.
    #[error("Step failed: {0}")]
    Step(String),

    /// The driver panicked mid-step.
    #[error("Automation driver crashed: {0}")]
    Panicked(String),

    #[error(transparent)]
    WebDriver(#[from] WebDriverError),

    #[error(transparent)]
    Image(#[from] ImageFetchError),
}

/// Drives one browser session through the warm-up steps.
///
/// Hard steps (`navigate_home`, `check_login`) return `Err` to abort the
/// pipeline. Soft steps report a [`StepOutcome`]; an `Err` from a soft step
/// is downgraded to [`StepOutcome::Failed`] by the caller.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Live session handle. Owned by the pipeline between open and close.
    type Session: Send;

    /// Short name for logs.
    fn name(&self) -> &str;

    /// Launch a browser bound to the profile's user data.
    async fn open_session(&self, profile: &Profile) -> Result<Self::Session, DriverError>;

    /// Release the session. Called exactly once per successful open.
    async fn close_session(&self, session: Self::Session) -> Result<(), DriverError>;

    /// Load the target home page.
    async fn navigate_home(&self, session: &mut Self::Session) -> Result<(), DriverError>;

    /// Fails with [`DriverError::NotLoggedIn`] when no account is signed in.
    async fn check_login(&self, session: &mut Self::Session) -> Result<(), DriverError>;

    async fn verify_feed_access(
        &self,
        session: &mut Self::Session,
    ) -> Result<StepOutcome, DriverError>;

    /// One scroll pass over the feed.
    async fn browse_feed(&self, session: &mut Self::Session) -> Result<(), DriverError>;

    async fn visit_first_post_author(
        &self,
        session: &mut Self::Session,
    ) -> Result<StepOutcome, DriverError>;

    async fn return_home(&self, session: &mut Self::Session) -> Result<StepOutcome, DriverError>;

    /// `NotApplicable` when the story tray is empty.
    async fn watch_first_story(
        &self,
        session: &mut Self::Session,
    ) -> Result<StepOutcome, DriverError>;

    /// An already-liked post counts as success.
    async fn like_first_post(&self, session: &mut Self::Session)
        -> Result<StepOutcome, DriverError>;

    async fn comment_on_first_post(
        &self,
        session: &mut Self::Session,
    ) -> Result<StepOutcome, DriverError>;

    /// `NotApplicable` when no image source is configured.
    async fn create_image_post(
        &self,
        session: &mut Self::Session,
    ) -> Result<StepOutcome, DriverError>;
}
