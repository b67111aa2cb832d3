use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{PageQuery, ProfileList, ProfilePatch},
    repo,
    repo_types::Profile,
    services::{follow, page_count, page_offset, unfollow, FollowList},
};
use crate::{
    auth::{ActiveUser, AdminUser},
    categories, tags,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/me", get(get_my_profile).put(update_my_profile))
        .route(
            "/profiles/me/follow/tags/:tag_id",
            put(follow_tag).delete(unfollow_tag),
        )
        .route(
            "/profiles/me/follow/categories/:category_id",
            put(follow_category).delete(unfollow_category),
        )
        .route("/profiles/:user_id", get(get_profile))
}

fn profile_not_found() -> AppError {
    AppError::not_found("Profile not found")
}

#[instrument(skip_all)]
pub async fn get_my_profile(State(state): State<AppState>, ActiveUser(user): ActiveUser) -> AppResult<Json<Profile>> {
    let profile = repo::find_by_user(&state.db, user.id)
        .await?
        .ok_or_else(profile_not_found)?;
    Ok(Json(profile))
}

#[instrument(skip(state, _caller))]
pub async fn get_profile(
    State(state): State<AppState>,
    ActiveUser(_caller): ActiveUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    let profile = repo::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(profile_not_found)?;
    Ok(Json(profile))
}

#[instrument(skip(state, _admin))]
pub async fn list_profiles(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<ProfileList>> {
    let offset = page_offset(q.page, q.size_per_page)?;
    let (profiles, total) = repo::list_page(&state.db, q.size_per_page, offset).await?;
    Ok(Json(ProfileList {
        profiles,
        page: q.page,
        page_count: page_count(total, q.size_per_page),
        size_per_page: q.size_per_page,
    }))
}

#[instrument(skip(state, user, patch))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<Profile>> {
    let mut tx = state.db.begin().await?;
    let mut profile = repo::lock_by_user_tx(&mut tx, user.id)
        .await?
        .ok_or_else(profile_not_found)?;
    patch.apply(&mut profile);
    let profile = repo::save(&mut *tx, &profile).await?;
    tx.commit().await?;

    info!(user_id = user.id, "profile updated");
    Ok(Json(profile))
}

async fn change_follow(
    state: &AppState,
    user_id: i64,
    list: FollowList,
    target: i64,
    add: bool,
) -> AppResult<Profile> {
    if add {
        let exists = match list {
            FollowList::Tags => tags::repo::exists(&state.db, target).await?,
            FollowList::Categories => categories::repo::exists(&state.db, target).await?,
        };
        if !exists {
            return Err(match list {
                FollowList::Tags => AppError::not_found("Tag not found"),
                FollowList::Categories => AppError::not_found("Category not found"),
            });
        }
    }

    let mut tx = state.db.begin().await?;
    let mut profile = repo::lock_by_user_tx(&mut tx, user_id)
        .await?
        .ok_or_else(profile_not_found)?;
    let changed = if add {
        follow(&mut profile, list, target)
    } else {
        unfollow(&mut profile, list, target)
    };
    if !changed {
        return Ok(profile);
    }
    let profile = repo::save(&mut *tx, &profile).await?;
    tx.commit().await?;

    info!(user_id, ?list, target, add, "follow list changed");
    Ok(profile)
}

#[instrument(skip(state, user))]
pub async fn follow_tag(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(tag_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    change_follow(&state, user.id, FollowList::Tags, tag_id, true).await.map(Json)
}

#[instrument(skip(state, user))]
pub async fn unfollow_tag(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(tag_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    change_follow(&state, user.id, FollowList::Tags, tag_id, false).await.map(Json)
}

#[instrument(skip(state, user))]
pub async fn follow_category(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(category_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    change_follow(&state, user.id, FollowList::Categories, category_id, true).await.map(Json)
}

#[instrument(skip(state, user))]
pub async fn unfollow_category(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(category_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    change_follow(&state, user.id, FollowList::Categories, category_id, false).await.map(Json)
}
