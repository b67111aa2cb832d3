use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{ChangePassword, Message, PublicUser, RegisterUser, RoleQuery, UserPatch},
    repo,
    services::{check_password, validate_registration},
};
use crate::{
    auth::{
        password::{hash_password, verify_password},
        ActiveUser, AdminUser, CurrentUser, Role, User,
    },
    db::is_unique_violation,
    error::{AppError, AppResult},
    profiles,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/create", post(register))
        .route("/users/me", get(get_me))
        .route("/users/update", put(update_me))
        .route("/users/change_password", put(change_password))
        .route("/users/:user_id", get(get_user).delete(delete_user))
        .route("/users/:user_id/updaterole", put(update_role))
}

fn duplicate_user() -> AppError {
    AppError::conflict("Username or email already exists.")
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    validate_registration(&mut payload).map_err(|e| {
        warn!(error = %e, "registration rejected");
        e
    })?;

    if repo::username_or_email_taken(&state.db, &payload.username, &payload.email, None).await? {
        warn!(username = %payload.username, "username or email already registered");
        return Err(duplicate_user());
    }

    let hash = hash_password(&payload.password)?;

    let mut tx = state.db.begin().await?;
    let user = repo::insert_user_tx(
        &mut tx,
        &payload.email,
        &payload.username,
        &payload.first_name,
        &payload.last_name,
        &hash,
        Role::User,
    )
    .await
    .map_err(|e| if is_unique_violation(&e) { duplicate_user() } else { e.into() })?;
    profiles::repo::insert_empty_tx(&mut tx, user.id).await?;
    tx.commit().await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, _caller))]
pub async fn get_user(
    State(state): State<AppState>,
    ActiveUser(_caller): ActiveUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

#[instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, AdminUser(_admin): AdminUser) -> AppResult<Json<Vec<PublicUser>>> {
    let users = repo::list_users(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, user, patch))]
pub async fn update_me(
    State(state): State<AppState>,
    ActiveUser(mut user): ActiveUser,
    Json(patch): Json<UserPatch>,
) -> AppResult<Json<PublicUser>> {
    if !patch.apply(&mut user)? {
        return Ok(Json(user.into()));
    }

    if repo::username_or_email_taken(&state.db, &user.username, &user.email, Some(user.id)).await? {
        return Err(duplicate_user());
    }

    let user = repo::save_identity(&state.db, &user)
        .await
        .map_err(|e| if is_unique_violation(&e) { duplicate_user() } else { e.into() })?;
    info!(user_id = user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(payload): Json<ChangePassword>,
) -> AppResult<Json<Message>> {
    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = user.id, "incorrect current password");
        return Err(AppError::Unauthenticated);
    }
    check_password(&payload.new_password)?;

    let hash = hash_password(&payload.new_password)?;
    repo::set_password(&state.db, user.id, &hash).await?;

    info!(user_id = user.id, "password changed");
    Ok(Json(Message {
        message: "Password updated successfully",
    }))
}

#[instrument(skip(state, admin))]
pub async fn update_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
    Query(q): Query<RoleQuery>,
) -> AppResult<Json<Message>> {
    let role: Role = q
        .new_role
        .parse()
        .map_err(|e: crate::auth::role::UnknownRole| AppError::bad_request(e.to_string()))?;

    if !repo::set_role(&state.db, user_id, role).await? {
        return Err(AppError::not_found("User not found"));
    }

    info!(user_id, admin_id = admin.id, %role, "role updated");
    Ok(Json(Message {
        message: "Update Role is Successful",
    }))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Message>> {
    if !repo::delete_user(&state.db, user_id).await? {
        return Err(AppError::not_found("User not found"));
    }
    info!(user_id, admin_id = admin.id, "user deleted");
    Ok(Json(Message {
        message: "User deleted successfully",
    }))
}
