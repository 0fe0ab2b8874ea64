//! Profile CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};
use warmup_core::{CreateProfileRequest, Profile, ProfileError, UpdateProfileRequest};

use super::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn profile_error(err: ProfileError) -> ApiError {
    let status = match &err {
        ProfileError::NotFound(_) => StatusCode::NOT_FOUND,
        ProfileError::DuplicatePath(_) | ProfileError::Invalid(_) => StatusCode::BAD_REQUEST,
        ProfileError::Storage(_) => {
            error!("Profile store failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let message = match &err {
        ProfileError::DuplicatePath(_) => "Profile path already exists".to_string(),
        other => other.to_string(),
    };
    (status, Json(ErrorResponse::new(message)))
}

/// List all registered profiles
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    state.profiles().list().map(Json).map_err(profile_error)
}

/// Register a new profile
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state.profiles().create(body).map_err(profile_error)?;
    info!("Profile added: {} ({})", profile.name, profile.path);
    Ok(Json(profile))
}

/// Update name and/or path of a profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.profiles().update(id, body).map_err(profile_error)?;
    Ok(SuccessResponse::ok())
}

/// Delete a profile. Unknown ids are not an error.
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if state.profiles().delete(id).map_err(profile_error)? {
        info!("Profile {} deleted", id);
    }
    Ok(SuccessResponse::ok())
}
