pub mod profile;
pub mod social_media;
