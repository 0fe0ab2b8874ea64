//! Pipeline step catalogue and outcome types.

use serde::{Deserialize, Serialize};

use crate::queue::EntryStatus;

/// How a step's failure affects the rest of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Failure aborts the pipeline and fails the entry.
    Hard,
    /// Failure is recorded; the pipeline continues.
    Soft,
    /// No failure path; always recorded as succeeded.
    BestEffort,
}

/// The fixed, ordered steps executed for one queue entry.
///
/// Declaration order is execution order (and the `Ord` used when results
/// are rendered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    BrowserSetup,
    Navigation,
    LoginCheck,
    FeedAccess,
    BrowseFeed,
    VisitProfile,
    ReturnHome,
    Story,
    LikePost,
    Comment,
    ImagePost,
}

impl PipelineStep {
    /// All steps in execution order.
    pub const ALL: [PipelineStep; 11] = [
        PipelineStep::BrowserSetup,
        PipelineStep::Navigation,
        PipelineStep::LoginCheck,
        PipelineStep::FeedAccess,
        PipelineStep::BrowseFeed,
        PipelineStep::VisitProfile,
        PipelineStep::ReturnHome,
        PipelineStep::Story,
        PipelineStep::LikePost,
        PipelineStep::Comment,
        PipelineStep::ImagePost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::BrowserSetup => "browser_setup",
            PipelineStep::Navigation => "navigation",
            PipelineStep::LoginCheck => "login_check",
            PipelineStep::FeedAccess => "feed_access",
            PipelineStep::BrowseFeed => "browse_feed",
            PipelineStep::VisitProfile => "visit_profile",
            PipelineStep::ReturnHome => "return_home",
            PipelineStep::Story => "story",
            PipelineStep::LikePost => "like_post",
            PipelineStep::Comment => "comment",
            PipelineStep::ImagePost => "image_post",
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        match self {
            PipelineStep::BrowserSetup | PipelineStep::Navigation | PipelineStep::LoginCheck => {
                FailurePolicy::Hard
            }
            PipelineStep::BrowseFeed => FailurePolicy::BestEffort,
            _ => FailurePolicy::Soft,
        }
    }

    /// Whether the stop flag is consulted right before this step.
    pub fn is_checkpoint(&self) -> bool {
        matches!(
            self,
            PipelineStep::BrowserSetup
                | PipelineStep::Navigation
                | PipelineStep::BrowseFeed
                | PipelineStep::Story
                | PipelineStep::LikePost
        )
    }

    /// Shown as `current_task` while the step runs.
    pub fn task_label(&self) -> &'static str {
        match self {
            PipelineStep::BrowserSetup => "Setting up browser",
            PipelineStep::Navigation => "Navigating to target",
            PipelineStep::LoginCheck => "Checking login status",
            PipelineStep::FeedAccess => "Verifying feed access",
            PipelineStep::BrowseFeed => "Browsing feed",
            PipelineStep::VisitProfile => "Visiting profile",
            PipelineStep::ReturnHome => "Returning home",
            PipelineStep::Story => "Watching story",
            PipelineStep::LikePost => "Liking post",
            PipelineStep::Comment => "Commenting on post",
            PipelineStep::ImagePost => "Creating image post",
        }
    }

    /// Human name used in result log lines, e.g. "Feed access: SUCCESS".
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStep::BrowserSetup => "Browser setup",
            PipelineStep::Navigation => "Navigation",
            PipelineStep::LoginCheck => "Login check",
            PipelineStep::FeedAccess => "Feed access",
            PipelineStep::BrowseFeed => "Feed browsing",
            PipelineStep::VisitProfile => "Profile visit",
            PipelineStep::ReturnHome => "Return home",
            PipelineStep::Story => "Story watch/like",
            PipelineStep::LikePost => "Post like",
            PipelineStep::Comment => "Comment",
            PipelineStep::ImagePost => "Image post",
        }
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    /// Nothing to act on (e.g. no stories in the tray).
    NotApplicable,
    Failed,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

impl From<bool> for StepOutcome {
    fn from(ok: bool) -> Self {
        if ok {
            StepOutcome::Succeeded
        } else {
            StepOutcome::Failed
        }
    }
}

/// Final classification of one pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every step ran (soft failures included).
    Completed,
    /// A hard step failed.
    Failed { error: String },
    /// Stop was requested at a checkpoint.
    Cancelled,
}

impl PipelineOutcome {
    /// Queue status the entry transitions to.
    pub fn entry_status(&self) -> EntryStatus {
        match self {
            PipelineOutcome::Completed => EntryStatus::Completed,
            PipelineOutcome::Failed { .. } => EntryStatus::Failed,
            PipelineOutcome::Cancelled => EntryStatus::Skipped,
        }
    }
}
