use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{AddressUpdate, CreateTransaction, ReceiptUpdate, StatusUpdate},
    repo,
    repo_types::Transaction,
    services,
};
use crate::{
    auth::{ActiveUser, AdminUser},
    error::{AppError, AppResult},
    state::AppState,
    users::dto::Message,
};

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/customer", get(list_customer_transactions))
        .route(
            "/transactions/:transaction_id",
            get(get_transaction).delete(delete_transaction),
        )
        .route("/transactions/:transaction_id/status", put(update_status))
        .route("/transactions/:transaction_id/address", put(update_address))
        .route("/transactions/:transaction_id/receipt", put(update_receipt))
        .route("/transactions/:transaction_id/cancel", put(cancel_transaction))
}

#[instrument(skip(state, user, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(payload): Json<CreateTransaction>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let created = services::create_transaction(&state.db, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all)]
pub async fn list_transactions(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(repo::list_all(&state.db).await?))
}

#[instrument(skip_all)]
pub async fn list_customer_transactions(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(repo::list_for_customer(&state.db, user.id).await?))
}

#[instrument(skip(state, user))]
pub async fn get_transaction(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(transaction_id): Path<i64>,
) -> AppResult<Json<Transaction>> {
    let t = repo::find(&state.db, transaction_id)
        .await?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;
    services::can_view(&t, &user)?;
    Ok(Json(t))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(transaction_id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<Transaction>> {
    let t = services::mutate(&state.db, transaction_id, |t, now| {
        services::apply_status(t, &payload.status, now).map(|_| ())
    })
    .await?;
    info!(transaction_id, admin_id = admin.id, "transaction status overridden");
    Ok(Json(t))
}

#[instrument(skip(state, user, payload))]
pub async fn update_address(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(transaction_id): Path<i64>,
    Json(payload): Json<AddressUpdate>,
) -> AppResult<Json<Transaction>> {
    let t = services::mutate(&state.db, transaction_id, |t, now| {
        services::apply_address(t, user.id, payload.address, now)
    })
    .await?;
    Ok(Json(t))
}

#[instrument(skip(state, user, payload))]
pub async fn update_receipt(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(transaction_id): Path<i64>,
    Json(payload): Json<ReceiptUpdate>,
) -> AppResult<Json<Transaction>> {
    let t = services::mutate(&state.db, transaction_id, |t, now| {
        services::apply_receipt(t, user.id, payload.receipt, now)
    })
    .await?;
    Ok(Json(t))
}

#[instrument(skip(state, user))]
pub async fn cancel_transaction(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(transaction_id): Path<i64>,
) -> AppResult<Json<Transaction>> {
    let t = services::mutate(&state.db, transaction_id, |t, now| {
        services::apply_cancel(t, user.id, now)
    })
    .await?;
    Ok(Json(t))
}

#[instrument(skip(state, admin))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(transaction_id): Path<i64>,
) -> AppResult<Json<Message>> {
    if !repo::delete(&state.db, transaction_id).await? {
        return Err(AppError::not_found("Transaction not found"));
    }
    info!(transaction_id, admin_id = admin.id, "transaction deleted");
    Ok(Json(Message {
        message: "Transaction deleted successfully",
    }))
}
