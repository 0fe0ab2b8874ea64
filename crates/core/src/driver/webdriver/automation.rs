//! [`AutomationDriver`] over a W3C WebDriver endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::json;
use tracing::{debug, info, warn};

use super::capabilities::session_capabilities;
use super::client::{WebDriverClient, WebDriverError, WebDriverSession, KEY_ENTER, KEY_ESCAPE};
use super::comments::random_comment;
use super::selectors::*;
use crate::config::DriverConfig;
use crate::driver::{AutomationDriver, DriverError, ImageFetcher};
use crate::pipeline::{jitter, pause_between as pause, StepOutcome};
use crate::profile::Profile;

/// How long to wait for the composer's Post button to enable after upload.
const POST_BUTTON_WAIT: Duration = Duration::from_secs(30);

/// Registrable part of the target host, e.g. "facebook.com".
fn target_domain(target_url: &str) -> String {
    reqwest::Url::parse(target_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|h| h.trim_start_matches("www.").to_string())
        .unwrap_or_else(|| target_url.to_string())
}

/// Drives Edge or Chrome through msedgedriver / chromedriver.
pub struct WebDriverAutomation {
    client: WebDriverClient,
    config: DriverConfig,
    images: Option<Arc<dyn ImageFetcher>>,
    domain: String,
}

impl WebDriverAutomation {
    pub fn new(
        config: DriverConfig,
        images: Option<Arc<dyn ImageFetcher>>,
    ) -> Result<Self, WebDriverError> {
        let client = WebDriverClient::new(
            &config.webdriver_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let domain = target_domain(&config.target_url);
        Ok(Self {
            client,
            config,
            images,
            domain,
        })
    }

    fn on_target(&self, url: &str) -> bool {
        url.contains(&self.domain)
    }

    /// Best-effort failure screenshot.
    async fn screenshot(&self, session: &WebDriverSession, name: &str) {
        let path = self.config.screenshots_dir.join(format!("{}.png", name));
        match self.client.save_screenshot(session, &path).await {
            Ok(()) => debug!("Screenshot saved: {}", path.display()),
            Err(e) => warn!("Error taking screenshot {}: {}", path.display(), e),
        }
    }

    async fn scroll_top(&self, session: &WebDriverSession) -> Result<(), WebDriverError> {
        self.client
            .execute(session, SCROLL_TOP_SCRIPT, Vec::new())
            .await
            .map(|_| ())
    }

    async fn scroll_by(&self, session: &WebDriverSession, pixels: i64) -> Result<(), WebDriverError> {
        self.client
            .execute(session, SCROLL_BY_SCRIPT, vec![json!(pixels)])
            .await
            .map(|_| ())
    }

    async fn close_story(&self, session: &WebDriverSession) {
        if let Err(e) = self.client.press_key(session, KEY_ESCAPE).await {
            debug!("Escape failed: {}", e);
        }
        pause(1000, 2000).await;

        let still_open = self
            .client
            .current_url(session)
            .await
            .map(|url| url.contains("/stories/"))
            .unwrap_or(true);
        if !still_open {
            return;
        }
        if self.client.find_and_activate(session, &STORY_CLOSE).await {
            pause(1000, 2000).await;
            return;
        }
        if let Err(e) = self.client.navigate(session, &self.config.target_url).await {
            warn!("Could not leave story viewer: {}", e);
        }
    }

    /// Wait for the composer's Post button to enable, then click until the
    /// dialog goes away.
    async fn submit_post(&self, session: &WebDriverSession) -> Result<bool, WebDriverError> {
        let deadline = tokio::time::Instant::now() + POST_BUTTON_WAIT;
        let mut button = None;
        while tokio::time::Instant::now() < deadline {
            let found = self
                .client
                .locate(session, &super::Locator::ByScript(ENABLED_POST_BUTTON_SCRIPT))
                .await?;
            if let Some(element) = found.into_iter().next() {
                button = Some(element);
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        let Some(button) = button else {
            warn!("Post button did not become enabled within {:?}", POST_BUTTON_WAIT);
            return Ok(false);
        };

        self.client.activate(session, &button).await?;
        tokio::time::sleep(Duration::from_secs(3)).await;
        if self.client.check(session, POST_SUBMITTED_SCRIPT).await? {
            return Ok(true);
        }

        debug!("Composer still open, retrying with native click");
        if let Err(e) = self.client.click(session, &button).await {
            debug!("Native click failed: {}", e);
        }
        pause(5000, 7000).await;
        self.client.check(session, POST_SUBMITTED_SCRIPT).await
    }
}

#[async_trait]
impl AutomationDriver for WebDriverAutomation {
    type Session = WebDriverSession;

    fn name(&self) -> &str {
        "webdriver"
    }

    async fn open_session(&self, profile: &Profile) -> Result<WebDriverSession, DriverError> {
        info!(
            "Opening {} session for profile '{}' ({})",
            self.config.browser, profile.name, profile.path
        );
        let capabilities = session_capabilities(&self.config.browser, &profile.path);
        let session = self
            .client
            .new_session(capabilities)
            .await
            .map_err(|e| DriverError::Setup(e.to_string()))?;

        let timeouts = self
            .client
            .set_timeouts(
                &session,
                Duration::from_secs(self.config.page_load_timeout_secs),
                Duration::from_secs(self.config.implicit_wait_secs),
            )
            .await;
        if let Err(e) = timeouts {
            if let Err(close_err) = self.client.delete_session(&session).await {
                warn!("Failed to delete half-open session: {}", close_err);
            }
            return Err(DriverError::Setup(e.to_string()));
        }

        debug!("Session {} ready", session.id());
        Ok(session)
    }

    async fn close_session(&self, session: WebDriverSession) -> Result<(), DriverError> {
        let result = self.client.delete_session(&session).await;
        if let Some(images) = &self.images {
            images.cleanup().await;
        }
        result.map_err(DriverError::from)
    }

    async fn navigate_home(&self, session: &mut WebDriverSession) -> Result<(), DriverError> {
        self.client
            .navigate(session, &self.config.target_url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        pause(3000, 5000).await;

        let url = self
            .client
            .current_url(session)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        if !self.on_target(&url) {
            return Err(DriverError::Navigation(format!("Unexpected URL: {}", url)));
        }
        debug!("Loaded {}", url);
        Ok(())
    }

    async fn check_login(&self, session: &mut WebDriverSession) -> Result<(), DriverError> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let state = self
            .client
            .execute(session, LOGIN_STATE_SCRIPT, Vec::new())
            .await?;
        match state.as_str() {
            Some("logged_in") => Ok(()),
            other => {
                debug!("Login state: {:?}", other);
                Err(DriverError::NotLoggedIn)
            }
        }
    }

    async fn verify_feed_access(
        &self,
        session: &mut WebDriverSession,
    ) -> Result<StepOutcome, DriverError> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let found = self.client.count(session, FEED_INDICATOR_SCRIPT).await?;
        debug!("Feed indicators visible: {}", found);
        Ok(StepOutcome::from(found >= 2))
    }

    async fn browse_feed(&self, session: &mut WebDriverSession) -> Result<(), DriverError> {
        let pixels = rand::thread_rng().gen_range(300..=800);
        self.scroll_by(session, pixels).await?;
        Ok(())
    }

    async fn visit_first_post_author(
        &self,
        session: &mut WebDriverSession,
    ) -> Result<StepOutcome, DriverError> {
        self.scroll_top(session).await?;
        pause(2000, 3000).await;
        self.scroll_by(session, 300).await?;
        pause(2000, 3000).await;
        self.scroll_top(session).await?;
        pause(2000, 3000).await;

        let before = self.client.current_url(session).await?;
        if !self.client.find_and_activate(session, &PROFILE_LINK).await {
            self.screenshot(session, "profile_not_found").await;
            return Ok(StepOutcome::Failed);
        }
        pause(3000, 5000).await;

        let after = self.client.current_url(session).await?;
        if after == before {
            warn!("URL did not change after clicking profile link");
            return Ok(StepOutcome::Failed);
        }
        if NON_PROFILE_PATHS.iter().any(|p| after.contains(p)) {
            warn!("Landed on non-profile page: {}", after);
            if let Err(e) = self.client.back(session).await {
                debug!("Back navigation failed: {}", e);
            }
            return Ok(StepOutcome::Failed);
        }

        info!("Navigated to profile: {}", after);
        self.scroll_by(session, 400).await?;
        pause(2000, 3000).await;
        Ok(StepOutcome::Succeeded)
    }

    async fn return_home(&self, session: &mut WebDriverSession) -> Result<StepOutcome, DriverError> {
        self.client.navigate(session, &self.config.target_url).await?;
        pause(3000, 5000).await;

        let url = self.client.current_url(session).await?;
        if !self.on_target(&url) {
            warn!("May not be on home page: {}", url);
            return Ok(StepOutcome::Failed);
        }
        self.scroll_top(session).await?;
        Ok(StepOutcome::Succeeded)
    }

    async fn watch_first_story(
        &self,
        session: &mut WebDriverSession,
    ) -> Result<StepOutcome, DriverError> {
        self.scroll_top(session).await?;
        pause(2000, 3000).await;

        if !self.client.find_and_activate(session, &STORY).await {
            info!("No stories available");
            return Ok(StepOutcome::NotApplicable);
        }
        pause(3000, 5000).await;

        if !self.client.check(session, STORY_VIEWER_SCRIPT).await? {
            self.screenshot(session, "story_not_opened").await;
            return Ok(StepOutcome::Failed);
        }

        let watch = jitter(5000, 8000);
        info!("Watching story for {:.1} seconds...", watch.as_secs_f32());
        tokio::time::sleep(watch).await;

        if self.client.find_and_activate(session, &LIKE).await {
            info!("Story liked");
            pause(1000, 2000).await;
        } else {
            debug!("Like button not found in story");
        }

        self.close_story(session).await;
        Ok(StepOutcome::Succeeded)
    }

    async fn like_first_post(
        &self,
        session: &mut WebDriverSession,
    ) -> Result<StepOutcome, DriverError> {
        self.scroll_by(session, 300).await?;
        pause(2000, 3000).await;
        self.scroll_top(session).await?;
        pause(2000, 3000).await;

        if self.client.find_and_activate(session, &LIKE).await {
            pause(2000, 3000).await;
            return Ok(StepOutcome::Succeeded);
        }
        if self.client.find_visible(session, &ALREADY_LIKED).await.is_some() {
            info!("Post is already liked");
            return Ok(StepOutcome::Succeeded);
        }

        self.screenshot(session, "like_button_not_found").await;
        Ok(StepOutcome::Failed)
    }

    async fn comment_on_first_post(
        &self,
        session: &mut WebDriverSession,
    ) -> Result<StepOutcome, DriverError> {
        let comment = random_comment(&mut rand::thread_rng());
        info!("Comment text: {}", comment);

        if !self.client.find_and_activate(session, &COMMENT_BUTTON).await {
            self.screenshot(session, "comment_button_not_found").await;
            return Ok(StepOutcome::Failed);
        }
        pause(2000, 3000).await;

        let Some(input) = self.client.find_last_visible(session, &TEXTBOX).await else {
            self.screenshot(session, "comment_input_not_found").await;
            return Ok(StepOutcome::Failed);
        };
        self.client.activate(session, &input).await?;
        pause(1000, 2000).await;

        self.client.send_keys(session, &input, &comment).await?;
        pause(2000, 3000).await;
        self.client.send_keys(session, &input, KEY_ENTER).await?;
        pause(3000, 5000).await;

        if let Err(e) = self.client.press_key(session, KEY_ESCAPE).await {
            debug!("Escape after comment failed: {}", e);
        }
        Ok(StepOutcome::Succeeded)
    }

    async fn create_image_post(
        &self,
        session: &mut WebDriverSession,
    ) -> Result<StepOutcome, DriverError> {
        let Some(images) = &self.images else {
            info!("No image source configured");
            return Ok(StepOutcome::NotApplicable);
        };
        let image = images.fetch_random_image().await?;
        let path = tokio::fs::canonicalize(&image.path)
            .await
            .map_err(|e| DriverError::Step(format!("image file missing: {}", e)))?;
        info!("Image ready at {}", path.display());

        self.scroll_top(session).await?;
        pause(2000, 3000).await;

        if !self.client.find_and_activate(session, &COMPOSER).await {
            self.screenshot(session, "post_creation_failed").await;
            return Ok(StepOutcome::Failed);
        }
        pause(2000, 4000).await;

        if !self.client.find_and_activate(session, &PHOTO_BUTTON).await {
            self.screenshot(session, "photo_button_not_found").await;
            return Ok(StepOutcome::Failed);
        }
        pause(2000, 3000).await;

        // Hidden inputs are fine here; the last one belongs to the open dialog.
        let inputs = self.client.locate(session, &FILE_INPUT[0]).await?;
        let Some(file_input) = inputs.last() else {
            self.screenshot(session, "file_input_not_found").await;
            return Ok(StepOutcome::Failed);
        };
        self.client
            .send_keys(session, file_input, &path.to_string_lossy())
            .await?;
        pause(5000, 8000).await;

        if let Some(textbox) = self.client.find_last_visible(session, &TEXTBOX).await {
            self.client
                .execute(
                    session,
                    SET_TEXT_SCRIPT,
                    vec![textbox.to_json(), json!(image.caption)],
                )
                .await?;
            pause(2000, 3000).await;
        } else {
            debug!("Caption box not found, posting without caption");
        }

        if self.submit_post(session).await? {
            info!("Image post published");
            Ok(StepOutcome::Succeeded)
        } else {
            self.screenshot(session, "post_verification_failed").await;
            Ok(StepOutcome::Failed)
        }
    }
}
