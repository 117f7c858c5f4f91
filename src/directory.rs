use chrono::NaiveDate;

use crate::models::profile::ProfileWithLinks;

/// Day and month, as the directory shows birthdays: `5 March`.
pub fn birth_date_display(dob: NaiveDate) -> String {
    dob.format("%-d %B").to_string()
}

/// Case-insensitive substring search over name, birthday, career, country and
/// state. A blank query keeps every profile; order is always preserved.
pub fn filter_profiles(profiles: &[ProfileWithLinks], query: &str) -> Vec<ProfileWithLinks> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return profiles.to_vec();
    }

    profiles
        .iter()
        .filter(|entry| matches_query(entry, &needle))
        .cloned()
        .collect()
}

fn matches_query(entry: &ProfileWithLinks, needle: &str) -> bool {
    let profile = &entry.profile;
    let birthday = profile.dob.map(birth_date_display);

    let matched = [
        Some(profile.first_name.as_str()),
        Some(profile.last_name.as_str()),
        birthday.as_deref(),
        profile.career.as_deref(),
        profile.country.as_deref(),
        profile.state.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle));
    matched
}
