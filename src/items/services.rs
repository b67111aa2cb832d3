use sqlx::{Postgres, Transaction};

use super::{
    dto::{CreateItem, ItemPatch},
    repo,
    repo_types::Item,
};
use crate::{
    categories,
    error::{AppError, AppResult},
    tags,
};

async fn check_refs(
    tx: &mut Transaction<'_, Postgres>,
    category_id: Option<i64>,
    tag_ids: &[i64],
) -> AppResult<()> {
    if let Some(category_id) = category_id {
        if categories::repo::find(&mut **tx, category_id).await?.is_none() {
            return Err(AppError::not_found("Category not found"));
        }
    }
    if !tag_ids.is_empty() {
        let missing = tags::repo::missing_ids(&mut **tx, tag_ids).await?;
        if !missing.is_empty() {
            return Err(AppError::not_found(format!("Tags not found: {missing:?}")));
        }
    }
    Ok(())
}

/// Inserts the item and its tag links as one unit; the owner always comes
/// from the resolved identity.
pub async fn create_item(db: &sqlx::PgPool, owner: i64, mut payload: CreateItem) -> AppResult<Item> {
    payload.validate()?;

    let mut tx = db.begin().await?;
    check_refs(&mut tx, payload.category_id, &payload.tags).await?;
    let item = repo::insert_tx(
        &mut tx,
        owner,
        payload.name_item.trim(),
        &payload.description,
        payload.price,
        &payload.images,
        &payload.status,
        payload.detail.as_ref(),
        payload.category_id,
    )
    .await?;
    if !payload.tags.is_empty() {
        repo::set_tags_tx(&mut tx, item.id_item, &payload.tags).await?;
    }
    tx.commit().await?;
    Ok(item)
}

/// Same signal for "missing" and "someone else's".
fn hidden() -> AppError {
    AppError::not_found("Item not found")
}

pub(crate) fn owned_by(item: Option<Item>, caller: i64) -> AppResult<Item> {
    match item {
        Some(item) if item.id_user == caller => Ok(item),
        _ => Err(hidden()),
    }
}

pub async fn update_item(db: &sqlx::PgPool, caller: i64, item_id: i64, patch: ItemPatch) -> AppResult<Item> {
    let mut tx = db.begin().await?;
    let mut item = owned_by(repo::lock_tx(&mut tx, item_id).await?, caller)?;

    let new_tags = patch.apply(&mut item)?;
    check_refs(&mut tx, item.category_id, new_tags.as_deref().unwrap_or_default()).await?;

    let item = repo::save_tx(&mut tx, &item).await?;
    if let Some(tag_ids) = new_tags {
        repo::set_tags_tx(&mut tx, item.id_item, &tag_ids).await?;
    }
    tx.commit().await?;
    Ok(item)
}

pub async fn delete_item(db: &sqlx::PgPool, caller: i64, item_id: i64) -> AppResult<()> {
    if !repo::delete_owned(db, item_id, caller).await? {
        return Err(hidden());
    }
    Ok(())
}
