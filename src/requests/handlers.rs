use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateRequest, RequestDetail, RequestUpdate, RespondRequest},
    repo,
    repo_types::Request,
    services,
};
use crate::{
    auth::{ActiveUser, AdminUser},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/my-requests", get(list_my_requests))
        .route(
            "/requests/:request_id",
            get(get_request).put(update_request).delete(delete_request),
        )
        .route("/requests/:request_id/respond", put(respond_request))
}

#[instrument(skip(state, user, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(payload): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<Request>)> {
    let request = services::create_request(&state.db, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[instrument(skip_all)]
pub async fn list_requests(State(state): State<AppState>, AdminUser(_): AdminUser) -> AppResult<Json<Vec<Request>>> {
    Ok(Json(repo::list_all(&state.db).await?))
}

#[instrument(skip_all)]
pub async fn list_my_requests(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> AppResult<Json<Vec<Request>>> {
    Ok(Json(repo::list_for_user(&state.db, user.id).await?))
}

#[instrument(skip(state, user))]
pub async fn get_request(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(request_id): Path<i64>,
) -> AppResult<Json<RequestDetail>> {
    let row = repo::find_detail(&state.db, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request not found"))?;
    services::party_of(&row.request, user.id)?;
    Ok(Json(RequestDetail::from(row)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_request(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(request_id): Path<i64>,
    Json(payload): Json<RequestUpdate>,
) -> AppResult<Json<Request>> {
    Ok(Json(services::update_request(&state.db, user.id, request_id, payload).await?))
}

#[instrument(skip(state, user, payload))]
pub async fn respond_request(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(request_id): Path<i64>,
    Json(payload): Json<RespondRequest>,
) -> AppResult<Json<Request>> {
    Ok(Json(services::respond_request(&state.db, user.id, request_id, payload).await?))
}

#[instrument(skip(state, user))]
pub async fn delete_request(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(request_id): Path<i64>,
) -> AppResult<StatusCode> {
    services::delete_request(&state.db, user.id, request_id).await?;
    info!(request_id, user_id = user.id, "request deleted");
    Ok(StatusCode::NO_CONTENT)
}
