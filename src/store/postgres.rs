use async_trait::async_trait;
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::Database;
use crate::models::profile::{NewProfile, Profile, ProfileChanges, ProfileWithLinks};
use crate::models::social_media::{NewSocialMediaLink, SocialMediaLink};
use crate::store::{ProfileStore, StoreError};

const SELECT_PROFILES: &str = "SELECT p.*, u.image_url AS user_image_url \
     FROM profiles p \
     LEFT JOIN users u ON u.id = p.user_id";

#[derive(Debug, FromRow)]
struct ProfileRow {
    #[sqlx(flatten)]
    profile: Profile,
    user_image_url: Option<String>,
}

#[derive(Clone)]
pub struct PgProfileStore {
    db: Database,
}

impl PgProfileStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<ProfileWithLinks>, StoreError> {
        let mut conn = self.db.acquire().await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!("{SELECT_PROFILES} WHERE p.user_id = $1"))
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(attach_links(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create(&self, identity: &Identity, new: NewProfile) -> Result<ProfileWithLinks, StoreError> {
        let mut tx = self.db.begin().await?;

        // Upsert the caller's user record
        let user_image_url = sqlx::query_scalar::<_, Option<String>>(
            "INSERT INTO users (id, email, image_url) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(EXCLUDED.email, users.email),
                image_url = COALESCE(EXCLUDED.image_url, users.image_url),
                updated_at = NOW()
             RETURNING image_url",
        )
        .bind(&identity.user_id)
        .bind(&identity.email)
        .bind(&identity.image_url)
        .fetch_one(&mut *tx)
        .await?;

        // Insert profile, unique user_id rejects a second one
        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles
                (id, user_id, first_name, last_name, dob, phone, email, career,
                 address, country, city, state, zip, image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&identity.user_id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.dob)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.career)
        .bind(&new.address)
        .bind(&new.country)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.zip)
        .bind(&new.image_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_or_database)?;

        let social_media_links = insert_links(&mut tx, profile.id, &new.social_media_links).await?;

        tx.commit().await?;

        Ok(ProfileWithLinks {
            profile,
            social_media_links,
            user_image_url,
        })
    }

    async fn update(&self, user_id: &str, changes: ProfileChanges) -> Result<Option<ProfileWithLinks>, StoreError> {
        let mut tx = self.db.begin().await?;

        // Row lock serializes concurrent updates of the same profile until commit.
        let current = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(mut profile) = current else {
            return Ok(None);
        };
        changes.apply_to(&mut profile);

        // Write merged fields
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET
                first_name = $1, last_name = $2, dob = $3, phone = $4, email = $5,
                career = $6, address = $7, country = $8, city = $9, state = $10,
                zip = $11, image_url = $12, updated_at = NOW()
             WHERE id = $13
             RETURNING *",
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.dob)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.career)
        .bind(&profile.address)
        .bind(&profile.country)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.zip)
        .bind(&profile.image_url)
        .bind(profile.id)
        .fetch_one(&mut *tx)
        .await?;

        // Replace all links, or keep the stored ones
        let social_media_links = match &changes.social_media_links {
            Some(links) => {
                sqlx::query("DELETE FROM social_media_links WHERE profile_id = $1")
                    .bind(profile.id)
                    .execute(&mut *tx)
                    .await?;
                insert_links(&mut tx, profile.id, links).await?
            }
            None => fetch_links(&mut tx, &[profile.id]).await?,
        };

        let user_image_url = sqlx::query_scalar::<_, Option<String>>("SELECT image_url FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .flatten();

        tx.commit().await?;

        Ok(Some(ProfileWithLinks {
            profile,
            social_media_links,
            user_image_url,
        }))
    }

    async fn list_by_verification(&self, verified: bool) -> Result<Vec<ProfileWithLinks>, StoreError> {
        let mut conn = self.db.acquire().await?;

        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "{SELECT_PROFILES} WHERE p.verified = $1 ORDER BY p.created_at, p.id"
        ))
        .bind(verified)
        .fetch_all(&mut *conn)
        .await?;

        Ok(attach_links(&mut conn, rows).await?)
    }

    async fn mark_verified(&self, profile_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET verified = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(profile_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }
}

fn duplicate_or_database(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate;
        }
    }
    StoreError::Database(err)
}

async fn insert_links(
    conn: &mut PgConnection,
    profile_id: Uuid,
    links: &[NewSocialMediaLink],
) -> Result<Vec<SocialMediaLink>, sqlx::Error> {
    let mut inserted = Vec::with_capacity(links.len());

    for (position, link) in (0_i32..).zip(links) {
        let row = sqlx::query_as::<_, SocialMediaLink>(
            "INSERT INTO social_media_links (id, profile_id, platform, url, position)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(profile_id)
        .bind(&link.platform)
        .bind(&link.url)
        .bind(position)
        .fetch_one(&mut *conn)
        .await?;
        inserted.push(row);
    }

    Ok(inserted)
}

async fn fetch_links(conn: &mut PgConnection, profile_ids: &[Uuid]) -> Result<Vec<SocialMediaLink>, sqlx::Error> {
    sqlx::query_as::<_, SocialMediaLink>(
        "SELECT * FROM social_media_links WHERE profile_id = ANY($1) ORDER BY profile_id, position",
    )
    .bind(profile_ids)
    .fetch_all(&mut *conn)
    .await
}

async fn attach_links(conn: &mut PgConnection, rows: Vec<ProfileRow>) -> Result<Vec<ProfileWithLinks>, sqlx::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.profile.id).collect();

    let mut links_by_profile: HashMap<Uuid, Vec<SocialMediaLink>> = HashMap::new();
    for link in fetch_links(conn, &ids).await? {
        links_by_profile.entry(link.profile_id).or_default().push(link);
    }

    Ok(rows
        .into_iter()
        .map(|row| ProfileWithLinks {
            social_media_links: links_by_profile.remove(&row.profile.id).unwrap_or_default(),
            profile: row.profile,
            user_image_url: row.user_image_url,
        })
        .collect())
}
