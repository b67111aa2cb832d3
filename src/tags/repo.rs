use sqlx::{PgExecutor, PgPool};

use super::repo_types::Tag;

pub async fn exists(db: &PgPool, id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tags WHERE id_tags = $1)")
        .bind(id)
        .fetch_one(db)
        .await
}

/// Ids from `ids` with no matching tag row.
pub async fn missing_ids<'e>(db: impl PgExecutor<'e>, ids: &[i64]) -> sqlx::Result<Vec<i64>> {
    sqlx::query_scalar(
        r#"
        SELECT wanted FROM UNNEST($1::BIGINT[]) AS wanted
         WHERE NOT EXISTS (SELECT 1 FROM tags WHERE id_tags = wanted)
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await
}

pub async fn find(db: &PgPool, id: i64) -> sqlx::Result<Option<Tag>> {
    sqlx::query_as::<_, Tag>("SELECT id_tags, name_tags FROM tags WHERE id_tags = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Tag>> {
    sqlx::query_as::<_, Tag>("SELECT id_tags, name_tags FROM tags ORDER BY id_tags")
        .fetch_all(db)
        .await
}

pub async fn insert(db: &PgPool, name: &str) -> sqlx::Result<Tag> {
    sqlx::query_as::<_, Tag>("INSERT INTO tags (name_tags) VALUES ($1) RETURNING id_tags, name_tags")
        .bind(name)
        .fetch_one(db)
        .await
}

pub async fn rename(db: &PgPool, id: i64, name: &str) -> sqlx::Result<Option<Tag>> {
    sqlx::query_as::<_, Tag>(
        "UPDATE tags SET name_tags = $2 WHERE id_tags = $1 RETURNING id_tags, name_tags",
    )
    .bind(id)
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM tags WHERE id_tags = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
