//! Testing utilities: a scriptable automation driver and fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use warmup_core::testing::{fixtures, MockDriver};
//!
//! let driver = Arc::new(MockDriver::new());
//! let profiles = Arc::new(InMemoryProfileStore::with_profiles(vec![
//!     fixtures::profile(1, "alice"),
//! ]));
//! let runner = QueueRunner::new(RunnerConfig::immediate(), driver, profiles, status);
//! ```

mod mock_driver;

pub use mock_driver::{MockDriver, MockSession, RecordedCall, StepHook};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::profile::Profile;

    /// A profile whose path follows the `<user data>/Profile N` layout.
    pub fn profile(id: u64, name: &str) -> Profile {
        Profile {
            id,
            name: name.to_string(),
            path: format!("/browser/User Data/Profile {}", id),
            created: Utc::now(),
        }
    }

    /// Profiles `1..=n` named after `names`.
    pub fn profiles(names: &[&str]) -> Vec<Profile> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| profile(i as u64 + 1, name))
            .collect()
    }

    /// Owned profile-name list for run requests.
    pub fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }
}
