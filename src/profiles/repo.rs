use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use super::repo_types::Profile;

const PROFILE_COLUMNS: &str = "id, user_id, gender, address, birthday, phone_number, profile_image, \
     followed_tags, followed_categories";

pub async fn insert_empty_tx(tx: &mut Transaction<'_, Postgres>, user_id: i64) -> sqlx::Result<Profile> {
    sqlx::query_as::<_, Profile>(&format!(
        "INSERT INTO profiles (user_id) VALUES ($1) RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await
}

pub async fn find_by_user<'e>(db: impl PgExecutor<'e>, user_id: i64) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn lock_by_user_tx(tx: &mut Transaction<'_, Postgres>, user_id: i64) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Writes back every mutable field of `profile`.
pub async fn save<'e>(db: impl PgExecutor<'e>, profile: &Profile) -> sqlx::Result<Profile> {
    sqlx::query_as::<_, Profile>(&format!(
        r#"
        UPDATE profiles
           SET gender = $2, address = $3, birthday = $4, phone_number = $5,
               profile_image = $6, followed_tags = $7, followed_categories = $8
         WHERE id = $1
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(profile.id)
    .bind(&profile.gender)
    .bind(&profile.address)
    .bind(&profile.birthday)
    .bind(&profile.phone_number)
    .bind(&profile.profile_image)
    .bind(&profile.followed_tags)
    .bind(&profile.followed_categories)
    .fetch_one(db)
    .await
}

pub async fn list_page(db: &PgPool, limit: i64, offset: i64) -> sqlx::Result<(Vec<Profile>, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(db)
        .await?;
    let rows = sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok((rows, total))
}
