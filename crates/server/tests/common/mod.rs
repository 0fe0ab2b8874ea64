//! Common test utilities for in-process API testing with mocks.
//!
//! The fixture wires the real router and queue runner to a [`MockDriver`]
//! and a profile store, so full runs complete in milliseconds without a
//! browser.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use warmup_core::{
    testing::MockDriver, Config, InMemoryProfileStore, ProfileStore, QueueRunner,
    RunController, RunnerConfig, StatusStore,
};

/// Re-export fixtures for test convenience
pub use warmup_core::testing::fixtures;

/// Test fixture for API testing with a mock automation driver.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_run() {
///     let fixture = TestFixture::with_profiles(&["alice"]);
///
///     let response = fixture.post("/api/run", json!({
///         "profiles": ["alice"],
///         "loops": 2
///     })).await;
///
///     assert_eq!(response.status, 200);
///     fixture.wait_until_idle().await;
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock driver - configure step outcomes and failures
    pub driver: Arc<MockDriver>,
    /// Profile store behind `/api/profiles`
    pub profiles: Arc<dyn ProfileStore>,
    /// Status store the runner reports into
    pub status: Arc<StatusStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture with an empty profile store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryProfileStore::new()))
    }

    /// Create a fixture with profiles `name` at fixture paths.
    pub fn with_profiles(names: &[&str]) -> Self {
        Self::with_store(Arc::new(InMemoryProfileStore::with_profiles(
            fixtures::profiles(names),
        )))
    }

    /// Create a fixture over a given profile store.
    pub fn with_store(profiles: Arc<dyn ProfileStore>) -> Self {
        let driver = Arc::new(MockDriver::new());
        let status = Arc::new(StatusStore::default());
        let runner = QueueRunner::new(
            RunnerConfig::immediate(),
            Arc::clone(&driver),
            Arc::clone(&profiles),
            Arc::clone(&status),
        );
        let controller: Arc<dyn RunController> = Arc::new(runner);

        let state = Arc::new(warmup_server::state::AppState::new(
            Config::default(),
            Arc::clone(&profiles),
            controller,
        ));
        let router = warmup_server::api::create_router(state);

        Self {
            router,
            driver,
            profiles,
            status,
        }
    }

    /// Poll until the active run has finished. Panics after 5 seconds.
    pub async fn wait_until_idle(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.status.is_running() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Run did not finish in time");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
