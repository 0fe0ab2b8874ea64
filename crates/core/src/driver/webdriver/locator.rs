//! Ordered element-location strategies.
//!
//! Page markup drifts, so every interaction names a [`Goal`]: a list of
//! [`Locator`]s tried in priority order until one yields a visible,
//! acceptable element.

use serde_json::Value;
use tracing::debug;

use super::client::{ElementRef, WebDriverClient, WebDriverError, WebDriverSession};

/// One way of finding candidate elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    ByCss(&'static str),
    ByXPath(&'static str),
    /// Script returning an element or `null`.
    ByScript(&'static str),
}

impl Locator {
    fn describe(&self) -> &'static str {
        match self {
            Locator::ByCss(s) | Locator::ByXPath(s) => s,
            Locator::ByScript(_) => "<script>",
        }
    }
}

/// Something to find and click.
#[derive(Debug, Clone, Copy)]
pub(super) struct Goal {
    pub name: &'static str,
    pub locators: &'static [Locator],
    /// Candidates whose label, text or href contains any of these
    /// (lowercase) fragments are passed over.
    pub reject: &'static [&'static str],
}

const DESCRIBE_SCRIPT: &str = r#"
var el = arguments[0];
return [el.getAttribute('aria-label') || '', el.innerText || '', el.getAttribute('href') || '']
    .join(' ').toLowerCase();
"#;

const SCROLL_INTO_VIEW_SCRIPT: &str =
    "arguments[0].scrollIntoView({behavior: 'instant', block: 'center'});";

const JS_CLICK_SCRIPT: &str = "arguments[0].click();";

pub(super) fn is_rejected(description: &str, reject: &[&str]) -> bool {
    reject.iter().any(|fragment| description.contains(fragment))
}

impl WebDriverClient {
    /// Raw candidates for one locator, in document order.
    pub async fn locate(
        &self,
        session: &WebDriverSession,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        match locator {
            Locator::ByCss(selector) => self.find_elements(session, "css selector", selector).await,
            Locator::ByXPath(selector) => self.find_elements(session, "xpath", selector).await,
            Locator::ByScript(script) => {
                let value = self.execute(session, script, Vec::new()).await?;
                Ok(ElementRef::from_json(&value).into_iter().collect())
            }
        }
    }

    async fn acceptable(
        &self,
        session: &WebDriverSession,
        element: &ElementRef,
        reject: &[&str],
    ) -> Result<bool, WebDriverError> {
        if !self.is_displayed(session, element).await? {
            return Ok(false);
        }
        if reject.is_empty() {
            return Ok(true);
        }
        let description = self
            .execute(session, DESCRIBE_SCRIPT, vec![element.to_json()])
            .await?;
        Ok(!is_rejected(description.as_str().unwrap_or_default(), reject))
    }

    /// First visible, non-rejected element across the goal's locators.
    pub(super) async fn find_visible(
        &self,
        session: &WebDriverSession,
        goal: &Goal,
    ) -> Option<ElementRef> {
        for locator in goal.locators {
            let candidates = match self.locate(session, locator).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    debug!("{}: locator {} failed: {}", goal.name, locator.describe(), e);
                    continue;
                }
            };
            for element in candidates {
                match self.acceptable(session, &element, goal.reject).await {
                    Ok(true) => {
                        debug!("{}: matched {}", goal.name, locator.describe());
                        return Some(element);
                    }
                    Ok(false) => {}
                    Err(e) => debug!("{}: candidate check failed: {}", goal.name, e),
                }
            }
        }
        None
    }

    /// Last visible element matching any locator (dialogs stack at the end).
    pub(super) async fn find_last_visible(
        &self,
        session: &WebDriverSession,
        locators: &[Locator],
    ) -> Option<ElementRef> {
        for locator in locators {
            let Ok(candidates) = self.locate(session, locator).await else {
                continue;
            };
            for element in candidates.into_iter().rev() {
                if matches!(self.is_displayed(session, &element).await, Ok(true)) {
                    return Some(element);
                }
            }
        }
        None
    }

    /// Scroll the element into view and click it, script first then native.
    pub(super) async fn activate(
        &self,
        session: &WebDriverSession,
        element: &ElementRef,
    ) -> Result<(), WebDriverError> {
        let args = vec![element.to_json()];
        if let Err(e) = self.execute(session, SCROLL_INTO_VIEW_SCRIPT, args.clone()).await {
            debug!("scrollIntoView failed: {}", e);
        }
        match self.execute(session, JS_CLICK_SCRIPT, args).await {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Script click failed, falling back to native click: {}", e);
                self.click(session, element).await
            }
        }
    }

    /// Find the goal's element and click it. Returns whether a click landed.
    pub(super) async fn find_and_activate(&self, session: &WebDriverSession, goal: &Goal) -> bool {
        let Some(element) = self.find_visible(session, goal).await else {
            debug!("{}: no candidate found", goal.name);
            return false;
        };
        match self.activate(session, &element).await {
            Ok(()) => true,
            Err(e) => {
                debug!("{}: activation failed: {}", goal.name, e);
                false
            }
        }
    }

    /// Run a script whose result is a number, defaulting to zero.
    pub(super) async fn count(&self, session: &WebDriverSession, script: &str) -> Result<u64, WebDriverError> {
        let value = self.execute(session, script, Vec::new()).await?;
        Ok(value.as_u64().unwrap_or(0))
    }

    /// Run a script whose result is a boolean, defaulting to false.
    pub(super) async fn check(&self, session: &WebDriverSession, script: &str) -> Result<bool, WebDriverError> {
        let value = self.execute(session, script, Vec::new()).await?;
        Ok(matches!(value, Value::Bool(true)))
    }
}
