//! Profile storage trait and the list operations shared by its backends.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use super::types::{CreateProfileRequest, Profile, UpdateProfileRequest};

/// Error type for profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Profile not found.
    #[error("Profile not found: {0}")]
    NotFound(u64),

    /// Another profile already uses this path.
    #[error("Profile path already exists: {0}")]
    DuplicatePath(String),

    /// Request failed validation.
    #[error("Invalid profile: {0}")]
    Invalid(String),

    /// Backing storage failed.
    #[error("Profile storage error: {0}")]
    Storage(String),
}

/// Trait for profile storage backends.
pub trait ProfileStore: Send + Sync {
    /// List all profiles in insertion order.
    fn list(&self) -> Result<Vec<Profile>, ProfileError>;

    /// Get a profile by ID.
    fn get(&self, id: u64) -> Result<Option<Profile>, ProfileError>;

    /// Register a new profile.
    fn create(&self, request: CreateProfileRequest) -> Result<Profile, ProfileError>;

    /// Update name and/or path of an existing profile.
    fn update(&self, id: u64, request: UpdateProfileRequest) -> Result<Profile, ProfileError>;

    /// Delete a profile. Returns whether anything was removed.
    fn delete(&self, id: u64) -> Result<bool, ProfileError>;

    /// Name -> profile lookup. Later duplicates of a name win.
    fn lookup_by_name(&self) -> Result<HashMap<String, Profile>, ProfileError> {
        Ok(self
            .list()?
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect())
    }
}

pub(super) fn apply_create(
    profiles: &mut Vec<Profile>,
    request: CreateProfileRequest,
) -> Result<Profile, ProfileError> {
    let name = request.name.trim();
    let path = request.path.trim();
    if name.is_empty() {
        return Err(ProfileError::Invalid("name cannot be empty".to_string()));
    }
    if path.is_empty() {
        return Err(ProfileError::Invalid("path cannot be empty".to_string()));
    }
    if profiles.iter().any(|p| p.path == path) {
        return Err(ProfileError::DuplicatePath(path.to_string()));
    }

    let id = profiles.iter().map(|p| p.id).max().unwrap_or(0) + 1;
    let profile = Profile {
        id,
        name: name.to_string(),
        path: path.to_string(),
        created: Utc::now(),
    };
    profiles.push(profile.clone());
    Ok(profile)
}

pub(super) fn apply_update(
    profiles: &mut [Profile],
    id: u64,
    request: UpdateProfileRequest,
) -> Result<Profile, ProfileError> {
    if let Some(path) = request.path.as_deref().map(str::trim) {
        if path.is_empty() {
            return Err(ProfileError::Invalid("path cannot be empty".to_string()));
        }
        if profiles.iter().any(|p| p.id != id && p.path == path) {
            return Err(ProfileError::DuplicatePath(path.to_string()));
        }
    }
    if let Some(name) = request.name.as_deref().map(str::trim) {
        if name.is_empty() {
            return Err(ProfileError::Invalid("name cannot be empty".to_string()));
        }
    }

    let profile = profiles
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(ProfileError::NotFound(id))?;

    if let Some(name) = request.name {
        profile.name = name.trim().to_string();
    }
    if let Some(path) = request.path {
        profile.path = path.trim().to_string();
    }
    Ok(profile.clone())
}

pub(super) fn apply_delete(profiles: &mut Vec<Profile>, id: u64) -> bool {
    let before = profiles.len();
    profiles.retain(|p| p.id != id);
    profiles.len() < before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(profiles: &mut Vec<Profile>, name: &str, path: &str) -> Result<Profile, ProfileError> {
        apply_create(
            profiles,
            CreateProfileRequest {
                name: name.to_string(),
                path: path.to_string(),
            },
        )
    }

    #[test]
    fn test_create_assigns_incrementing_ids() {
        let mut profiles = Vec::new();
        let a = create(&mut profiles, "alice", "/p/a").unwrap();
        let b = create(&mut profiles, "bob", "/p/b").unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn test_create_after_delete_uses_max_id() {
        let mut profiles = Vec::new();
        create(&mut profiles, "alice", "/p/a").unwrap();
        create(&mut profiles, "bob", "/p/b").unwrap();
        assert!(apply_delete(&mut profiles, 1));
        let c = create(&mut profiles, "carol", "/p/c").unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_create_rejects_duplicate_path() {
        let mut profiles = Vec::new();
        create(&mut profiles, "alice", "/p/a").unwrap();
        let err = create(&mut profiles, "other", "/p/a").unwrap_err();
        assert!(matches!(err, ProfileError::DuplicatePath(_)));
        assert_eq!(profiles.len(), 1);
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let mut profiles = Vec::new();
        assert!(matches!(
            create(&mut profiles, " ", "/p/a"),
            Err(ProfileError::Invalid(_))
        ));
        assert!(matches!(
            create(&mut profiles, "alice", ""),
            Err(ProfileError::Invalid(_))
        ));
    }

    #[test]
    fn test_update_partial() {
        let mut profiles = Vec::new();
        create(&mut profiles, "alice", "/p/a").unwrap();
        let updated = apply_update(
            &mut profiles,
            1,
            UpdateProfileRequest {
                name: Some("alicia".to_string()),
                path: None,
            },
        )
        .unwrap();
        assert_eq!(updated.name, "alicia");
        assert_eq!(updated.path, "/p/a");
    }

    #[test]
    fn test_update_unknown_and_duplicate() {
        let mut profiles = Vec::new();
        create(&mut profiles, "alice", "/p/a").unwrap();
        create(&mut profiles, "bob", "/p/b").unwrap();

        let missing = apply_update(&mut profiles, 9, UpdateProfileRequest::default());
        assert!(matches!(missing, Err(ProfileError::NotFound(9))));

        let dup = apply_update(
            &mut profiles,
            2,
            UpdateProfileRequest {
                name: None,
                path: Some("/p/a".to_string()),
            },
        );
        assert!(matches!(dup, Err(ProfileError::DuplicatePath(_))));

        // Keeping its own path is fine
        let same = apply_update(
            &mut profiles,
            2,
            UpdateProfileRequest {
                name: None,
                path: Some("/p/b".to_string()),
            },
        );
        assert!(same.is_ok());
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut profiles = Vec::new();
        create(&mut profiles, "alice", "/p/a").unwrap();
        assert!(!apply_delete(&mut profiles, 42));
        assert_eq!(profiles.len(), 1);
    }
}
