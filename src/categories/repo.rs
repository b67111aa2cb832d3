use sqlx::{PgExecutor, PgPool};

use super::repo_types::Category;

pub async fn exists(db: &PgPool, id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id_category = $1)")
        .bind(id)
        .fetch_one(db)
        .await
}

pub async fn name_taken(db: &PgPool, name: &str, except_id: Option<i64>) -> sqlx::Result<bool> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM categories
             WHERE name_category = $1 AND ($2::BIGINT IS NULL OR id_category <> $2)
        )
        "#,
    )
    .bind(name)
    .bind(except_id)
    .fetch_one(db)
    .await
}

pub async fn find<'e>(db: impl PgExecutor<'e>, id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT id_category, name_category, category_image FROM categories WHERE id_category = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT id_category, name_category, category_image FROM categories ORDER BY id_category",
    )
    .fetch_all(db)
    .await
}

pub async fn insert(db: &PgPool, name: &str, image: &str) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name_category, category_image)
        VALUES ($1, $2)
        RETURNING id_category, name_category, category_image
        "#,
    )
    .bind(name)
    .bind(image)
    .fetch_one(db)
    .await
}

pub async fn save(db: &PgPool, category: &Category) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories SET name_category = $2, category_image = $3
         WHERE id_category = $1
        RETURNING id_category, name_category, category_image
        "#,
    )
    .bind(category.id_category)
    .bind(&category.name_category)
    .bind(&category.category_image)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM categories WHERE id_category = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
