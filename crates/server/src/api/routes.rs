use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, profiles, run};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Profiles
        .route(
            "/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/profiles/{id}",
            put(profiles::update_profile).delete(profiles::delete_profile),
        )
        // Run control
        .route("/run", post(run::start_run))
        .route("/status", get(run::get_status))
        .route("/stop", post(run::stop_run))
        .route("/reset", post(run::reset_status))
        .route("/clear-logs", post(run::clear_logs));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
