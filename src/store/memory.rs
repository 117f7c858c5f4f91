use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::profile::{NewProfile, Profile, ProfileChanges, ProfileWithLinks};
use crate::models::social_media::{NewSocialMediaLink, SocialMediaLink};
use crate::store::{ProfileStore, StoreError};

#[derive(Debug, Clone, Default)]
struct UserRecord {
    email: Option<String>,
    image_url: Option<String>,
}

#[derive(Default)]
struct State {
    profiles: Vec<Profile>,
    links: Vec<SocialMediaLink>,
    users: HashMap<String, UserRecord>,
}

impl State {
    fn with_links(&self, profile: &Profile) -> ProfileWithLinks {
        ProfileWithLinks {
            profile: profile.clone(),
            social_media_links: self
                .links
                .iter()
                .filter(|link| link.profile_id == profile.id)
                .cloned()
                .collect(),
            user_image_url: self
                .users
                .get(&profile.user_id)
                .and_then(|user| user.image_url.clone()),
        }
    }

    fn insert_links(&mut self, profile_id: Uuid, links: &[NewSocialMediaLink]) {
        for (position, link) in (0_i32..).zip(links) {
            self.links.push(SocialMediaLink {
                id: Uuid::new_v4(),
                profile_id,
                platform: link.platform.clone(),
                url: link.url.clone(),
                position,
                created_at: Utc::now(),
            });
        }
    }
}

/// Store backed by process memory. A single lock makes every call atomic.
#[derive(Default)]
pub struct MemoryProfileStore {
    state: Mutex<State>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a profile directly, bypassing the create path.
    pub fn insert(&self, profile: Profile, links: &[NewSocialMediaLink]) {
        let mut state = self.state.lock();
        state.insert_links(profile.id, links);
        state.profiles.push(profile);
    }

    pub fn link_count(&self) -> usize {
        self.state.lock().links.len()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<ProfileWithLinks>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .profiles
            .iter()
            .find(|profile| profile.user_id == user_id)
            .map(|profile| state.with_links(profile)))
    }

    async fn create(&self, identity: &Identity, new: NewProfile) -> Result<ProfileWithLinks, StoreError> {
        let mut state = self.state.lock();

        if state.profiles.iter().any(|profile| profile.user_id == identity.user_id) {
            return Err(StoreError::Duplicate);
        }

        let user = state.users.entry(identity.user_id.clone()).or_default();
        if identity.email.is_some() {
            user.email.clone_from(&identity.email);
        }
        if identity.image_url.is_some() {
            user.image_url.clone_from(&identity.image_url);
        }

        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: identity.user_id.clone(),
            first_name: new.first_name,
            last_name: new.last_name,
            dob: new.dob,
            phone: new.phone,
            email: new.email,
            career: new.career,
            address: new.address,
            country: new.country,
            city: new.city,
            state: new.state,
            zip: new.zip,
            image_url: new.image_url,
            verified: false,
            created_at: now,
            updated_at: now,
        };

        state.insert_links(profile.id, &new.social_media_links);
        state.profiles.push(profile.clone());
        Ok(state.with_links(&profile))
    }

    async fn update(&self, user_id: &str, changes: ProfileChanges) -> Result<Option<ProfileWithLinks>, StoreError> {
        let mut state = self.state.lock();

        let Some(profile) = state.profiles.iter_mut().find(|profile| profile.user_id == user_id) else {
            return Ok(None);
        };
        changes.apply_to(profile);
        profile.updated_at = Utc::now();
        let profile = profile.clone();

        if let Some(links) = &changes.social_media_links {
            state.links.retain(|link| link.profile_id != profile.id);
            state.insert_links(profile.id, links);
        }

        Ok(Some(state.with_links(&profile)))
    }

    async fn list_by_verification(&self, verified: bool) -> Result<Vec<ProfileWithLinks>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .profiles
            .iter()
            .filter(|profile| profile.verified == verified)
            .map(|profile| state.with_links(profile))
            .collect())
    }

    async fn mark_verified(&self, profile_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let mut state = self.state.lock();
        Ok(state
            .profiles
            .iter_mut()
            .find(|profile| profile.id == profile_id)
            .map(|profile| {
                profile.verified = true;
                profile.updated_at = Utc::now();
                profile.clone()
            }))
    }
}
