//! Run control handlers: start, status, stop, reset, clear logs.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use warmup_core::{OrchestratorError, RunState};

use super::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Request body for starting a run
#[derive(Debug, Default, Deserialize)]
pub struct RunBody {
    /// Profile names, in queue order
    #[serde(default)]
    pub profiles: Vec<String>,
    /// Requested rounds; anything but a positive integer means 1
    #[serde(default)]
    pub loops: Value,
}

/// Response for an accepted run
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub success: bool,
    pub message: String,
    pub total_tasks: usize,
    pub rounds: u32,
}

/// Rounds requested by a `loops` value before clamping.
///
/// Only JSON integers count; integers too large for `i64` saturate so they
/// clamp to the maximum.
pub fn requested_rounds(loops: &Value) -> i64 {
    match loops {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .unwrap_or(1),
        _ => 1,
    }
}

fn bad_request(error: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error)))
}

/// Start a run over the selected profiles
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunBody>,
) -> Result<Json<RunResponse>, ApiError> {
    if state.status().is_running() {
        return Err(bad_request(OrchestratorError::AlreadyRunning.to_string()));
    }

    let rounds = requested_rounds(&body.loops);
    let started = state
        .runner()
        .start(body.profiles, rounds)
        .map_err(|e| {
            warn!("Run rejected: {}", e);
            bad_request(e.to_string())
        })?;

    let message = format!(
        "Started queue: {} profiles x {} rounds = {} tasks",
        started.profiles, started.rounds, started.total_tasks
    );
    info!("{}", message);
    Ok(Json(RunResponse {
        success: true,
        message,
        total_tasks: started.total_tasks,
        rounds: started.rounds,
    }))
}

/// Current run state
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<RunState> {
    Json(state.status().snapshot())
}

/// Request a cooperative stop; returns immediately
pub async fn stop_run(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    state.status().request_stop();
    SuccessResponse::ok()
}

/// Restore the idle state; rejected while a run is active
pub async fn reset_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .status()
        .reset()
        .map_err(|e| bad_request(e.to_string()))?;
    Ok(SuccessResponse::ok())
}

/// Empty the log ring only
pub async fn clear_logs(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    state.status().clear_logs();
    SuccessResponse::ok()
}
