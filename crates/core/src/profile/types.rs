//! Profile data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A browser profile on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique, monotonically assigned.
    pub id: u64,
    /// Display name, used to select profiles for a run.
    pub name: String,
    /// Browser user-data path (unique).
    pub path: String,
    pub created: DateTime<Utc>,
}

/// Request to register a new profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    pub path: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}
