use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::profile::{NewProfile, Profile, ProfileChanges, ProfileWithLinks};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a profile already exists for this user")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for profiles and their social media links.
///
/// Every method that writes more than one row runs as a single transaction.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<ProfileWithLinks>, StoreError>;

    /// Inserts the profile and its links, and links the caller's user record.
    /// Fails with [`StoreError::Duplicate`] if the identity already owns a profile.
    async fn create(&self, identity: &Identity, profile: NewProfile) -> Result<ProfileWithLinks, StoreError>;

    /// Applies `changes` to the profile owned by `user_id`. A supplied links list
    /// replaces all existing links. Returns `None` if the user has no profile.
    async fn update(&self, user_id: &str, changes: ProfileChanges) -> Result<Option<ProfileWithLinks>, StoreError>;

    /// Profiles with the given verification state, oldest first.
    async fn list_by_verification(&self, verified: bool) -> Result<Vec<ProfileWithLinks>, StoreError>;

    async fn mark_verified(&self, profile_id: Uuid) -> Result<Option<Profile>, StoreError>;
}
