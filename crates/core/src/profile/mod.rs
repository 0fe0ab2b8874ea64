//! Browser profiles the runner can warm up.
//!
//! Profiles are owned by a [`ProfileStore`]; the orchestrator only reads a
//! name lookup built once per run.

mod json_store;
mod memory_store;
mod store;
mod types;

pub use json_store::JsonProfileStore;
pub use memory_store::InMemoryProfileStore;
pub use store::{ProfileError, ProfileStore};
pub use types::{CreateProfileRequest, Profile, UpdateProfileRequest};
