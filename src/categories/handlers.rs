use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{clean_name, CategoryPatch, CreateCategory},
    repo,
    repo_types::Category,
};
use crate::{
    auth::ActiveUser,
    db::is_unique_violation,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:category_id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

fn duplicate_name() -> AppError {
    AppError::conflict("Category name already exists")
}

fn not_found() -> AppError {
    AppError::not_found("Category not found")
}

#[instrument(skip(state, user, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(payload): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = clean_name(&payload.name_category)?;
    if repo::name_taken(&state.db, &name, None).await? {
        warn!(name = %name, "category name already exists");
        return Err(duplicate_name());
    }

    let category = repo::insert(&state.db, &name, &payload.category_image)
        .await
        .map_err(|e| if is_unique_violation(&e) { duplicate_name() } else { e.into() })?;

    info!(category_id = category.id_category, user_id = user.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, _user))]
pub async fn get_category(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Path(category_id): Path<i64>,
) -> AppResult<Json<Category>> {
    repo::find(&state.db, category_id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>, ActiveUser(_user): ActiveUser) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(repo::list(&state.db).await?))
}

#[instrument(skip(state, _user, patch))]
pub async fn update_category(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Path(category_id): Path<i64>,
    Json(patch): Json<CategoryPatch>,
) -> AppResult<Json<Category>> {
    let mut category = repo::find(&state.db, category_id).await?.ok_or_else(not_found)?;
    patch.apply(&mut category)?;

    if repo::name_taken(&state.db, &category.name_category, Some(category_id)).await? {
        return Err(duplicate_name());
    }

    let category = repo::save(&state.db, &category)
        .await
        .map_err(|e| if is_unique_violation(&e) { duplicate_name() } else { e.into() })?;
    info!(category_id, "category updated");
    Ok(Json(category))
}

#[instrument(skip(state, _user))]
pub async fn delete_category(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Path(category_id): Path<i64>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, category_id).await? {
        return Err(not_found());
    }
    info!(category_id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
