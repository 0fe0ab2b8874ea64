//! Queue entry types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a queue entry.
///
/// `Pending` is the only initial state; `Completed`, `Failed` and `Skipped`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl EntryStatus {
    /// Whether the entry has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntryStatus::Completed | EntryStatus::Failed | EntryStatus::Skipped
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Running => "running",
            EntryStatus::Completed => "completed",
            EntryStatus::Failed => "failed",
            EntryStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (profile, round) unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Profile name as selected by the operator (resolved at run time).
    #[serde(rename = "profile")]
    pub profile_name: String,
    /// 1-based round number.
    pub round: u32,
    pub status: EntryStatus,
}

impl QueueEntry {
    pub fn new(profile_name: impl Into<String>, round: u32) -> Self {
        Self {
            profile_name: profile_name.into(),
            round,
            status: EntryStatus::Pending,
        }
    }

    /// Key used in the completed/failed sets and task results, e.g. `alice_R2`.
    pub fn key(&self) -> String {
        format!("{}_R{}", self.profile_name, self.round)
    }
}
