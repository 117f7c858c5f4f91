use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::social_media::{NewSocialMediaLink, SocialMediaLink};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub career: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub image_url: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile together with its social media links and the avatar of the
/// linked user account, if one is known.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileWithLinks {
    #[serde(flatten)]
    pub profile: Profile,
    pub social_media_links: Vec<SocialMediaLink>,
    pub user_image_url: Option<String>,
}

/// Date of birth as sent by clients: either `{"year", "month", "day"}` or
/// a string (`YYYY-MM-DD` or an RFC 3339 timestamp).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DateOfBirthInput {
    Parts { year: i32, month: u32, day: u32 },
    Text(String),
}

impl DateOfBirthInput {
    /// Returns `Ok(None)` for an empty string, which clears the date.
    pub fn parse(&self) -> Result<Option<NaiveDate>, String> {
        match self {
            DateOfBirthInput::Parts { year, month, day } => {
                NaiveDate::from_ymd_opt(*year, *month, *day)
                    .map(Some)
                    .ok_or_else(|| format!("{year}-{month}-{day} is not a valid date"))
            }
            DateOfBirthInput::Text(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(None);
                }
                if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    return Ok(Some(date));
                }
                DateTime::parse_from_rfc3339(raw)
                    .map(|timestamp| Some(timestamp.date_naive()))
                    .map_err(|_| format!("'{raw}' is not a valid date"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<DateOfBirthInput>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub career: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub social_media_links: Vec<NewSocialMediaLink>,
}

/// Update payload. For the optional fields an absent key leaves the stored
/// value alone while an explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub dob: Option<Option<DateOfBirthInput>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub career: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub country: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub state: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub zip: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub image_url: Option<Option<String>>,
    pub social_media_links: Option<Vec<NewSocialMediaLink>>,
}

/// Validated input for inserting a profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub career: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub image_url: Option<String>,
    pub social_media_links: Vec<NewSocialMediaLink>,
}

/// Validated update. `None` leaves a field untouched, `Some(None)` clears it.
/// A `Some` links list replaces every existing link of the profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<Option<NaiveDate>>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub career: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub zip: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub social_media_links: Option<Vec<NewSocialMediaLink>>,
}

impl ProfileChanges {
    /// Applies the field changes to a loaded profile. Links are handled by the store.
    pub fn apply_to(&self, profile: &mut Profile) {
        profile.first_name.clone_from(&self.first_name);
        profile.last_name.clone_from(&self.last_name);

        if let Some(dob) = self.dob {
            profile.dob = dob;
        }
        assign(&mut profile.phone, &self.phone);
        assign(&mut profile.email, &self.email);
        assign(&mut profile.career, &self.career);
        assign(&mut profile.address, &self.address);
        assign(&mut profile.country, &self.country);
        assign(&mut profile.city, &self.city);
        assign(&mut profile.state, &self.state);
        assign(&mut profile.zip, &self.zip);
        assign(&mut profile.image_url, &self.image_url);
    }
}

fn assign(field: &mut Option<String>, change: &Option<Option<String>>) {
    if let Some(value) = change {
        field.clone_from(value);
    }
}
