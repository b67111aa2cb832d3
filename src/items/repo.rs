use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use super::repo_types::{Item, ItemViewRow};

pub(crate) const ITEM_COLUMNS: &str = "id_item, id_user, name_item, description, price, images, \
     status, detail, category_id, created_at, updated_at";

const VIEW_SELECT: &str = r#"
    SELECT i.id_item, i.id_user, i.name_item, i.description, i.price, i.images,
           i.status, i.detail, i.category_id, i.created_at, i.updated_at,
           c.name_category, c.category_image,
           COALESCE(ARRAY_AGG(t.id_tags ORDER BY t.id_tags) FILTER (WHERE t.id_tags IS NOT NULL), '{}') AS tag_ids,
           COALESCE(ARRAY_AGG(t.name_tags ORDER BY t.id_tags) FILTER (WHERE t.id_tags IS NOT NULL), '{}') AS tag_names,
           u.username AS owner_username,
           u.first_name AS owner_first_name,
           u.last_name AS owner_last_name
      FROM items i
      JOIN users u ON u.id = i.id_user
      LEFT JOIN categories c ON c.id_category = i.category_id
      LEFT JOIN item_tags it ON it.item_id = i.id_item
      LEFT JOIN tags t ON t.id_tags = it.tag_id
"#;

const VIEW_GROUP: &str = " GROUP BY i.id_item, c.id_category, u.id ORDER BY i.id_item";

pub async fn find<'e>(db: impl PgExecutor<'e>, id: i64) -> sqlx::Result<Option<Item>> {
    sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id_item = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Row-locks the item until the surrounding transaction ends.
pub async fn lock_tx(tx: &mut Transaction<'_, Postgres>, id: i64) -> sqlx::Result<Option<Item>> {
    sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id_item = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn list_views(db: &PgPool, owner: Option<i64>) -> sqlx::Result<Vec<ItemViewRow>> {
    sqlx::query_as::<_, ItemViewRow>(&format!(
        "{VIEW_SELECT} WHERE ($1::BIGINT IS NULL OR i.id_user = $1) {VIEW_GROUP}"
    ))
    .bind(owner)
    .fetch_all(db)
    .await
}

pub async fn find_view(db: &PgPool, id: i64) -> sqlx::Result<Option<ItemViewRow>> {
    sqlx::query_as::<_, ItemViewRow>(&format!("{VIEW_SELECT} WHERE i.id_item = $1 {VIEW_GROUP}"))
        .bind(id)
        .fetch_optional(db)
        .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner: i64,
    name_item: &str,
    description: &str,
    price: f64,
    images: &[String],
    status: &str,
    detail: Option<&serde_json::Value>,
    category_id: Option<i64>,
) -> sqlx::Result<Item> {
    sqlx::query_as::<_, Item>(&format!(
        r#"
        INSERT INTO items (id_user, name_item, description, price, images, status, detail, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(owner)
    .bind(name_item)
    .bind(description)
    .bind(price)
    .bind(images)
    .bind(status)
    .bind(detail)
    .bind(category_id)
    .fetch_one(&mut **tx)
    .await
}

/// Replaces the item's tag links with exactly `tag_ids`.
pub async fn set_tags_tx(tx: &mut Transaction<'_, Postgres>, item_id: i64, tag_ids: &[i64]) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM item_tags WHERE item_id = $1")
        .bind(item_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("INSERT INTO item_tags (item_id, tag_id) SELECT $1, UNNEST($2::BIGINT[])")
        .bind(item_id)
        .bind(tag_ids)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Writes back every mutable field of `item` and bumps `updated_at`.
pub async fn save_tx(tx: &mut Transaction<'_, Postgres>, item: &Item) -> sqlx::Result<Item> {
    sqlx::query_as::<_, Item>(&format!(
        r#"
        UPDATE items
           SET name_item = $2, description = $3, price = $4, images = $5,
               status = $6, detail = $7, category_id = $8, updated_at = now()
         WHERE id_item = $1
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(item.id_item)
    .bind(&item.name_item)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.images)
    .bind(&item.status)
    .bind(&item.detail)
    .bind(item.category_id)
    .fetch_one(&mut **tx)
    .await
}

pub async fn set_status_tx(tx: &mut Transaction<'_, Postgres>, id: i64, status: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE items SET status = $2, updated_at = now() WHERE id_item = $1")
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Deletes only when `owner` owns the item.
pub async fn delete_owned(db: &PgPool, id: i64, owner: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM items WHERE id_item = $1 AND id_user = $2")
        .bind(id)
        .bind(owner)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
