use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{dto::TagInput, repo, repo_types::Tag};
use crate::{
    auth::AdminUser,
    db::is_unique_violation,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:tag_id", get(get_tag).put(update_tag).delete(delete_tag))
}

fn map_unique(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::conflict("Tag name already exists")
    } else {
        e.into()
    }
}

fn not_found() -> AppError {
    AppError::not_found("Tag not found")
}

#[instrument(skip_all)]
pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    Ok(Json(repo::list(&state.db).await?))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_tag(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<TagInput>,
) -> AppResult<(StatusCode, Json<Tag>)> {
    let tag = repo::insert(&state.db, payload.name()?).await.map_err(map_unique)?;
    info!(tag_id = tag.id_tags, admin_id = admin.id, "tag created");
    Ok((StatusCode::CREATED, Json(tag)))
}

#[instrument(skip(state, _admin))]
pub async fn get_tag(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(tag_id): Path<i64>,
) -> AppResult<Json<Tag>> {
    repo::find(&state.db, tag_id).await?.map(Json).ok_or_else(not_found)
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_tag(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(tag_id): Path<i64>,
    Json(payload): Json<TagInput>,
) -> AppResult<Json<Tag>> {
    let tag = repo::rename(&state.db, tag_id, payload.name()?)
        .await
        .map_err(map_unique)?
        .ok_or_else(not_found)?;
    info!(tag_id, "tag renamed");
    Ok(Json(tag))
}

#[instrument(skip(state, _admin))]
pub async fn delete_tag(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(tag_id): Path<i64>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, tag_id).await? {
        return Err(not_found());
    }
    info!(tag_id, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
