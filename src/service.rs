use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::directory::filter_profiles;
use crate::error::ProfileError;
use crate::models::profile::{
    CreateProfileRequest, DateOfBirthInput, NewProfile, Profile, ProfileChanges, ProfileWithLinks,
    UpdateProfileRequest,
};
use crate::models::social_media::NewSocialMediaLink;
use crate::revalidate::{ViewCache, HOME_ROUTE};
use crate::store::ProfileStore;

pub const CREATE_LOGIN_REQUIRED: &str = "You must be logged in to create your profile.";
pub const UPDATE_LOGIN_REQUIRED: &str = "You must be logged in to update your profile.";

#[derive(Debug, Serialize)]
pub struct DirectoryListing {
    pub total: usize,
    pub profiles: Vec<ProfileWithLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_requests: Option<Vec<ProfileWithLinks>>,
}

/// Profile operations. The store is injected; nothing here holds global state.
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    views: ViewCache,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>, views: ViewCache) -> Self {
        Self { store, views }
    }

    pub async fn get_own(&self, caller: Option<&Identity>) -> Result<ProfileWithLinks, ProfileError> {
        let identity = caller.ok_or(ProfileError::Unauthenticated("User not authenticated."))?;

        self.store
            .find_by_user(&identity.user_id)
            .await
            .map_err(ProfileError::persistence("Error fetching profile."))?
            .ok_or(ProfileError::NotFound)
    }

    pub async fn create(
        &self,
        caller: Option<&Identity>,
        request: CreateProfileRequest,
    ) -> Result<ProfileWithLinks, ProfileError> {
        let identity = caller.ok_or(ProfileError::Unauthenticated(CREATE_LOGIN_REQUIRED))?;
        let new_profile = validate_create(request)?;

        let existing = self
            .store
            .find_by_user(&identity.user_id)
            .await
            .map_err(ProfileError::persistence("Profile creation not successful."))?;
        if existing.is_some() {
            return Err(ProfileError::AlreadyExists);
        }

        let created = self
            .store
            .create(identity, new_profile)
            .await
            .map_err(ProfileError::persistence("Profile creation not successful."))?;

        self.views.revalidate(HOME_ROUTE);
        tracing::info!(user_id = %identity.user_id, profile_id = %created.profile.id, "profile created");
        Ok(created)
    }

    pub async fn update(
        &self,
        caller: Option<&Identity>,
        request: UpdateProfileRequest,
    ) -> Result<ProfileWithLinks, ProfileError> {
        let identity = caller.ok_or(ProfileError::Unauthenticated(UPDATE_LOGIN_REQUIRED))?;
        let changes = validate_update(request)?;
        let replaced_links = changes.social_media_links.as_ref().map(Vec::len);

        let updated = self
            .store
            .update(&identity.user_id, changes)
            .await
            .map_err(ProfileError::persistence("Profile update not successful."))?
            .ok_or(ProfileError::NotFound)?;

        self.views.revalidate(HOME_ROUTE);
        tracing::info!(
            user_id = %identity.user_id,
            profile_id = %updated.profile.id,
            replaced_links = ?replaced_links,
            "profile updated"
        );
        Ok(updated)
    }

    /// Verified members filtered by `query`. Callers whose own profile is
    /// verified also receive the pending join requests.
    pub async fn directory(&self, caller: Option<&Identity>, query: &str) -> Result<DirectoryListing, ProfileError> {
        let identity = caller.ok_or(ProfileError::Unauthenticated("You must be logged in to browse the directory."))?;

        let verified = self.verified_profiles().await?;

        let caller_verified = verified.iter().any(|entry| entry.profile.user_id == identity.user_id);
        let join_requests = if caller_verified {
            Some(
                self.store
                    .list_by_verification(false)
                    .await
                    .map_err(ProfileError::persistence("Error fetching join requests."))?,
            )
        } else {
            None
        };

        Ok(DirectoryListing {
            total: verified.len(),
            profiles: filter_profiles(&verified, query),
            join_requests,
        })
    }

    /// Approves a pending profile. Only verified members may approve.
    pub async fn verify(&self, caller: Option<&Identity>, profile_id: Uuid) -> Result<Profile, ProfileError> {
        let identity = caller.ok_or(ProfileError::Unauthenticated("You must be logged in to approve join requests."))?;

        let approver = self
            .store
            .find_by_user(&identity.user_id)
            .await
            .map_err(ProfileError::persistence("Profile verification not successful."))?;
        if !approver.is_some_and(|entry| entry.profile.verified) {
            return Err(ProfileError::Forbidden("Only verified members can approve join requests."));
        }

        let profile = self
            .store
            .mark_verified(profile_id)
            .await
            .map_err(ProfileError::persistence("Profile verification not successful."))?
            .ok_or(ProfileError::NotFound)?;

        self.views.revalidate(HOME_ROUTE);
        tracing::info!(approver = %identity.user_id, %profile_id, "profile verified");
        Ok(profile)
    }

    async fn verified_profiles(&self) -> Result<Arc<Vec<ProfileWithLinks>>, ProfileError> {
        if let Some(cached) = self.views.get(HOME_ROUTE) {
            return Ok(cached);
        }

        let ticket = self.views.ticket();
        let listing = Arc::new(
            self.store
                .list_by_verification(true)
                .await
                .map_err(ProfileError::persistence("Error fetching verified profiles."))?,
        );
        self.views.store(HOME_ROUTE, ticket, Arc::clone(&listing));
        Ok(listing)
    }
}

fn required_name(field: &'static str, value: Option<String>) -> Result<String, ProfileError> {
    value
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ProfileError::validation(field, "First name and last name are required."))
}

fn parse_dob(input: &DateOfBirthInput) -> Result<Option<chrono::NaiveDate>, ProfileError> {
    input.parse().map_err(|message| ProfileError::validation("dob", message))
}

fn validate_links(links: Vec<NewSocialMediaLink>) -> Result<Vec<NewSocialMediaLink>, ProfileError> {
    links
        .into_iter()
        .map(|link| {
            let platform = link.platform.trim().to_string();
            let url = link.url.trim().to_string();
            if platform.is_empty() || url.is_empty() {
                return Err(ProfileError::validation(
                    "social_media_links",
                    "Every link needs a platform and a url.",
                ));
            }
            Ok(NewSocialMediaLink { platform, url })
        })
        .collect()
}

fn validate_create(request: CreateProfileRequest) -> Result<NewProfile, ProfileError> {
    let first_name = required_name("first_name", request.first_name)?;
    let last_name = required_name("last_name", request.last_name)?;
    let dob = match &request.dob {
        Some(input) => parse_dob(input)?,
        None => None,
    };

    Ok(NewProfile {
        first_name,
        last_name,
        dob,
        phone: request.phone,
        email: request.email,
        career: request.career,
        address: request.address,
        country: request.country,
        city: request.city,
        state: request.state,
        zip: request.zip,
        image_url: request.image_url,
        social_media_links: validate_links(request.social_media_links)?,
    })
}

fn validate_update(request: UpdateProfileRequest) -> Result<ProfileChanges, ProfileError> {
    let first_name = required_name("first_name", request.first_name)?;
    let last_name = required_name("last_name", request.last_name)?;
    let dob = match &request.dob {
        Some(Some(input)) => Some(parse_dob(input)?),
        Some(None) => Some(None),
        None => None,
    };
    let social_media_links = request.social_media_links.map(validate_links).transpose()?;

    Ok(ProfileChanges {
        first_name,
        last_name,
        dob,
        phone: request.phone,
        email: request.email,
        career: request.career,
        address: request.address,
        country: request.country,
        city: request.city,
        state: request.state,
        zip: request.zip,
        image_url: request.image_url,
        social_media_links,
    })
}
