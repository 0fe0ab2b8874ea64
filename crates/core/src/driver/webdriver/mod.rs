//! W3C WebDriver backend.

mod automation;
mod capabilities;
mod client;
mod comments;
mod locator;
mod selectors;

pub use automation::WebDriverAutomation;
pub use client::{ElementRef, WebDriverClient, WebDriverError, WebDriverSession};
pub use locator::Locator;
