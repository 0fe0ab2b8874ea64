//! Profile store backed by a flat JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::store::{apply_create, apply_delete, apply_update};
use super::{CreateProfileRequest, Profile, ProfileError, ProfileStore, UpdateProfileRequest};

/// Persists the profile list as a pretty-printed JSON array.
///
/// The file is re-read on every call so edits made by hand are picked up.
/// A missing file is an empty list; it is created on the first write.
pub struct JsonProfileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Profile>, ProfileError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| ProfileError::Storage(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ProfileError::Storage(format!("invalid {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, profiles: &[Profile]) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ProfileError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(profiles)
            .map_err(|e| ProfileError::Storage(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| ProfileError::Storage(e.to_string()))?;
        debug!("Saved {} profiles to {}", profiles.len(), self.path.display());
        Ok(())
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Vec<Profile>) -> Result<T, ProfileError>,
    ) -> Result<T, ProfileError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| ProfileError::Storage(e.to_string()))?;
        let mut profiles = self.load()?;
        let result = f(&mut profiles)?;
        self.save(&profiles)?;
        Ok(result)
    }
}

impl ProfileStore for JsonProfileStore {
    fn list(&self) -> Result<Vec<Profile>, ProfileError> {
        self.load()
    }

    fn get(&self, id: u64) -> Result<Option<Profile>, ProfileError> {
        Ok(self.load()?.into_iter().find(|p| p.id == id))
    }

    fn create(&self, request: CreateProfileRequest) -> Result<Profile, ProfileError> {
        self.modify(|profiles| apply_create(profiles, request))
    }

    fn update(&self, id: u64, request: UpdateProfileRequest) -> Result<Profile, ProfileError> {
        self.modify(|profiles| apply_update(profiles, id, request))
    }

    fn delete(&self, id: u64) -> Result<bool, ProfileError> {
        self.modify(|profiles| Ok(apply_delete(profiles, id)))
    }
}
