//! Queue lifecycle integration tests.
//!
//! These tests drive whole runs through the queue runner against the mock
//! driver: pending -> running -> completed | failed | skipped.

use std::sync::Arc;

use warmup_core::{
    testing::{fixtures, MockDriver},
    EntryStatus, InMemoryProfileStore, JsonProfileStore, PipelineStep, ProfileStore, QueueRunner,
    RunState, RunSummary, RunnerConfig, StatusStore,
};

/// Test helper holding a runner and handles on everything it touches.
struct TestHarness {
    driver: Arc<MockDriver>,
    status: Arc<StatusStore>,
    runner: QueueRunner<MockDriver>,
}

impl TestHarness {
    fn new(profiles: &[&str]) -> Self {
        let store = Arc::new(InMemoryProfileStore::with_profiles(fixtures::profiles(
            profiles,
        )));
        Self::with_store(store)
    }

    fn with_store(store: Arc<dyn ProfileStore>) -> Self {
        let driver = Arc::new(MockDriver::new());
        let status = Arc::new(StatusStore::default());
        let runner = QueueRunner::new(
            RunnerConfig::immediate(),
            Arc::clone(&driver),
            store,
            Arc::clone(&status),
        );
        Self {
            driver,
            status,
            runner,
        }
    }

    async fn run(&self, selected: &[&str], rounds: i64) -> RunSummary {
        self.runner
            .run(fixtures::names(selected), rounds)
            .await
            .expect("run rejected")
    }

    fn state(&self) -> RunState {
        self.status.snapshot()
    }

    /// Stop the run as soon as `step` is entered.
    async fn stop_at(&self, step: PipelineStep) {
        let status = Arc::clone(&self.status);
        self.driver.on_step(step, move || status.request_stop()).await;
    }
}

fn statuses(state: &RunState) -> Vec<EntryStatus> {
    state.queue.iter().map(|e| e.status).collect()
}

fn assert_counts_balance(state: &RunState) {
    let in_flight = state.count(EntryStatus::Pending) + state.count(EntryStatus::Running);
    assert_eq!(
        state.completed.len() + state.failed.len() + state.count(EntryStatus::Skipped) + in_flight,
        state.queue.len(),
        "unbalanced counts: {:?}",
        state.queue
    );
}

#[tokio::test]
async fn test_single_profile_two_rounds_complete() {
    let harness = TestHarness::new(&["alice"]);

    let summary = harness.run(&["alice"], 2).await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 0);
    assert!(!summary.stopped);

    let state = harness.state();
    assert!(!state.running);
    assert_eq!(state.completed, vec!["alice_R1", "alice_R2"]);
    assert!(state.failed.is_empty());
    let order: Vec<_> = state
        .queue
        .iter()
        .map(|e| (e.profile_name.as_str(), e.round))
        .collect();
    assert_eq!(order, vec![("alice", 1), ("alice", 2)]);
    assert_eq!(state.current_queue_index, -1);
    assert_eq!(state.current_profile, None);
}

#[tokio::test]
async fn test_unresolved_profile_skipped_without_driver_calls() {
    let harness = TestHarness::new(&["alice"]);

    let summary = harness.run(&["bob"], 1).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.completed + summary.failed, 0);
    assert_eq!(statuses(&harness.state()), vec![EntryStatus::Skipped]);
    assert!(harness.driver.calls().await.is_empty());
    assert!(harness.state().task_results.get("bob_R1").is_none());
}

#[tokio::test]
async fn test_setup_failure_marks_entry_failed() {
    let harness = TestHarness::new(&["carol"]);
    harness.driver.fail_setup("carol").await;

    let summary = harness.run(&["carol"], 1).await;

    assert_eq!(summary.failed, 1);
    let state = harness.state();
    assert_eq!(state.failed, vec!["carol_R1"]);
    let result = &state.task_results["carol_R1"];
    assert!(result.steps.is_empty());
    assert!(result.error.as_deref().unwrap().contains("carol"));

    // No session was opened, so none is closed.
    assert_eq!(harness.driver.opened().await, 0);
    assert_eq!(harness.driver.closed().await, 0);
}

#[tokio::test]
async fn test_navigation_failure_keeps_prior_steps_only() {
    let harness = TestHarness::new(&["carol"]);
    harness
        .driver
        .set_step_error(PipelineStep::Navigation, "target unreachable")
        .await;

    harness.run(&["carol"], 1).await;

    let state = harness.state();
    let result = &state.task_results["carol_R1"];
    let steps: Vec<_> = result.steps.keys().copied().collect();
    assert_eq!(steps, vec![PipelineStep::BrowserSetup]);
    assert!(result.error.is_some());
    assert_eq!(harness.driver.opened().await, 1);
    assert_eq!(harness.driver.closed().await, 1);
}

#[tokio::test]
async fn test_stop_mid_run_skips_all_pending() {
    let harness = TestHarness::new(&["a", "b", "c"]);
    // Comment comes after the last checkpoint, so the current entry finishes.
    harness.stop_at(PipelineStep::Comment).await;

    let summary = harness.run(&["a", "b", "c"], 2).await;

    assert!(summary.stopped);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.skipped, 5);

    let state = harness.state();
    assert!(!state.running);
    assert_eq!(
        statuses(&state),
        vec![
            EntryStatus::Completed,
            EntryStatus::Skipped,
            EntryStatus::Skipped,
            EntryStatus::Skipped,
            EntryStatus::Skipped,
            EntryStatus::Skipped,
        ]
    );
    assert_eq!(harness.driver.opened().await, 1);
}

#[tokio::test]
async fn test_stop_at_checkpoint_skips_current_entry() {
    let harness = TestHarness::new(&["a", "b"]);
    harness.stop_at(PipelineStep::VisitProfile).await;

    let summary = harness.run(&["a", "b"], 1).await;

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.completed, 0);
    let state = harness.state();
    assert!(state.completed.is_empty());
    assert!(state.failed.is_empty());
    assert!(!harness.driver.was_called(PipelineStep::Story).await);
    assert_eq!(harness.driver.opened().await, harness.driver.closed().await);
}

#[tokio::test]
async fn test_entries_after_stop_never_complete_or_fail() {
    let harness = TestHarness::new(&["a", "b", "c"]);
    harness.driver.set_logged_out("c").await;
    harness.stop_at(PipelineStep::LikePost).await;

    harness.run(&["a", "b", "c"], 3).await;

    let state = harness.state();
    let first_stopped = state
        .queue
        .iter()
        .position(|e| e.status == EntryStatus::Skipped)
        .expect("something was skipped");
    assert!(state.queue[first_stopped..]
        .iter()
        .all(|e| e.status == EntryStatus::Skipped));
    assert!(state.failed.is_empty());
}

#[tokio::test]
async fn test_multi_round_order_is_round_major() {
    let harness = TestHarness::new(&["alice", "bob"]);

    harness.run(&["alice", "bob"], 2).await;

    assert_eq!(
        harness.driver.profiles_for(PipelineStep::BrowserSetup).await,
        vec!["alice", "bob", "alice", "bob"]
    );
    assert_eq!(
        harness.state().completed,
        vec!["alice_R1", "bob_R1", "alice_R2", "bob_R2"]
    );
}

#[tokio::test]
async fn test_counts_balance_during_run() {
    let harness = TestHarness::new(&["alice", "bob"]);
    harness.driver.set_logged_out("bob").await;
    let status = Arc::clone(&harness.status);
    harness
        .driver
        .on_step(PipelineStep::Navigation, move || {
            let state = status.snapshot();
            assert!(state.running);
            assert_counts_balance(&state);
        })
        .await;

    harness.run(&["ghost", "alice", "bob"], 2).await;

    let state = harness.state();
    assert_counts_balance(&state);
    assert_eq!(state.count(EntryStatus::Pending), 0);
    assert_eq!(state.count(EntryStatus::Running), 0);
    assert_eq!(state.completed, vec!["alice_R1", "alice_R2"]);
    assert_eq!(state.failed, vec!["bob_R1", "bob_R2"]);
    assert_eq!(state.count(EntryStatus::Skipped), 2);
}

#[tokio::test]
async fn test_sessions_balanced_on_every_path() {
    let harness = TestHarness::new(&["ok", "logged_out", "broken", "stopper"]);
    harness.driver.set_logged_out("logged_out").await;
    harness.driver.fail_setup("broken").await;

    harness.run(&["ok", "logged_out", "broken"], 2).await;
    assert_eq!(harness.driver.opened().await, 4);
    assert_eq!(harness.driver.closed().await, 4);

    harness.stop_at(PipelineStep::Story).await;
    harness.run(&["stopper"], 1).await;
    assert_eq!(harness.driver.opened().await, 5);
    assert_eq!(harness.driver.closed().await, 5);
}

#[tokio::test]
async fn test_reset_twice_yields_same_state() {
    let harness = TestHarness::new(&["alice"]);
    harness.run(&["alice"], 1).await;

    harness.status.reset().unwrap();
    let first = serde_json::to_value(harness.state()).unwrap();
    harness.status.reset().unwrap();
    let second = serde_json::to_value(harness.state()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first["queue"], serde_json::json!([]));
    assert_eq!(first["current_queue_index"], -1);
}

#[tokio::test]
async fn test_runs_against_json_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(JsonProfileStore::new(dir.path().join("profiles.json")));
    store
        .create(warmup_core::CreateProfileRequest {
            name: "alice".to_string(),
            path: "/data/User Data/Default".to_string(),
        })
        .unwrap();
    let harness = TestHarness::with_store(store);

    let summary = harness.run(&["alice"], 1).await;

    assert_eq!(summary.completed, 1);
    assert_eq!(
        harness.driver.profiles_for(PipelineStep::ImagePost).await,
        vec!["alice"]
    );
}
