use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateItem, ItemPatch, ItemView},
    repo, services,
};
use crate::{
    auth::ActiveUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/my-items", get(list_my_items))
        .route(
            "/items/:item_id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

async fn load_view(state: &AppState, item_id: i64) -> AppResult<ItemView> {
    repo::find_view(&state.db, item_id)
        .await?
        .map(|row| ItemView::from_row(row, false))
        .ok_or_else(|| AppError::not_found("Item not found"))
}

#[instrument(skip(state, user, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(payload): Json<CreateItem>,
) -> AppResult<(StatusCode, HeaderMap, Json<ItemView>)> {
    let item = services::create_item(&state.db, user.id, payload).await?;
    info!(item_id = item.id_item, user_id = user.id, "item created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/items/{}", item.id_item).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(load_view(&state, item.id_item).await?)))
}

#[instrument(skip_all)]
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<ItemView>>> {
    let rows = repo::list_views(&state.db, None).await?;
    Ok(Json(rows.into_iter().map(|r| ItemView::from_row(r, true)).collect()))
}

#[instrument(skip_all)]
pub async fn list_my_items(State(state): State<AppState>, ActiveUser(user): ActiveUser) -> AppResult<Json<Vec<ItemView>>> {
    let rows = repo::list_views(&state.db, Some(user.id)).await?;
    Ok(Json(rows.into_iter().map(|r| ItemView::from_row(r, false)).collect()))
}

#[instrument(skip(state, user))]
pub async fn get_item(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<ItemView>> {
    let view = load_view(&state, item_id).await?;
    if view.id_user != user.id {
        return Err(AppError::not_found("Item not found"));
    }
    Ok(Json(view))
}

#[instrument(skip(state, user, patch))]
pub async fn update_item(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(item_id): Path<i64>,
    Json(patch): Json<ItemPatch>,
) -> AppResult<Json<ItemView>> {
    let item = services::update_item(&state.db, user.id, item_id, patch).await?;
    info!(item_id, user_id = user.id, status = %item.status, "item updated");
    Ok(Json(load_view(&state, item_id).await?))
}

#[instrument(skip(state, user))]
pub async fn delete_item(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(item_id): Path<i64>,
) -> AppResult<StatusCode> {
    services::delete_item(&state.db, user.id, item_id).await?;
    info!(item_id, user_id = user.id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}
