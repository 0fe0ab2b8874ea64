//! HTTP control surface for the warmup runner.

pub mod api;
pub mod state;

pub use api::create_router;
pub use state::AppState;
