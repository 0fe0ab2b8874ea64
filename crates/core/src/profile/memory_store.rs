//! In-memory profile store (tests and ephemeral setups).

use std::sync::Mutex;

use super::store::{apply_create, apply_delete, apply_update};
use super::{CreateProfileRequest, Profile, ProfileError, ProfileStore, UpdateProfileRequest};

/// Profile store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<Vec<Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing profiles.
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Profile>>, ProfileError> {
        self.profiles
            .lock()
            .map_err(|e| ProfileError::Storage(e.to_string()))
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn list(&self) -> Result<Vec<Profile>, ProfileError> {
        Ok(self.lock()?.clone())
    }

    fn get(&self, id: u64) -> Result<Option<Profile>, ProfileError> {
        Ok(self.lock()?.iter().find(|p| p.id == id).cloned())
    }

    fn create(&self, request: CreateProfileRequest) -> Result<Profile, ProfileError> {
        let mut profiles = self.lock()?;
        apply_create(&mut profiles, request)
    }

    fn update(&self, id: u64, request: UpdateProfileRequest) -> Result<Profile, ProfileError> {
        let mut profiles = self.lock()?;
        apply_update(&mut profiles, id, request)
    }

    fn delete(&self, id: u64) -> Result<bool, ProfileError> {
        let mut profiles = self.lock()?;
        Ok(apply_delete(&mut profiles, id))
    }
}
