//! Transaction lifecycle: Waiting -> Confirm | Cancel.
//!
//! Customer-side edits are gated on the caller being the recorded customer
//! and, for the address, on the transaction still waiting. Status is free to
//! be set by an administrator.

use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;

use super::{
    dto::CreateTransaction,
    repo,
    repo_types::{Transaction, TransactionStatus},
};
use crate::{
    auth::{guards, Role, User},
    error::{AppError, AppResult},
    items,
};

fn require_customer(t: &Transaction, actor: i64) -> Result<(), AppError> {
    if t.id_user_customer != actor {
        return Err(AppError::forbidden("Only the customer can modify this transaction"));
    }
    Ok(())
}

/// Customer, seller or an administrator may read a transaction.
pub fn can_view(t: &Transaction, user: &User) -> Result<(), AppError> {
    if t.id_user_customer == user.id || t.id_user_seller == Some(user.id) {
        return Ok(());
    }
    guards::require_role_at_least(user, Role::Admin)
}

pub fn apply_address(t: &mut Transaction, actor: i64, address: String, now: OffsetDateTime) -> Result<(), AppError> {
    require_customer(t, actor)?;
    if t.status() != Some(TransactionStatus::Waiting) {
        return Err(AppError::invalid("Address can only be changed while the transaction is waiting"));
    }
    t.address = address;
    t.update_time = now;
    Ok(())
}

pub fn apply_receipt(t: &mut Transaction, actor: i64, receipt: String, now: OffsetDateTime) -> Result<(), AppError> {
    require_customer(t, actor)?;
    t.receipt = receipt;
    t.update_time = now;
    Ok(())
}

pub fn apply_cancel(t: &mut Transaction, actor: i64, now: OffsetDateTime) -> Result<(), AppError> {
    require_customer(t, actor)?;
    match t.status() {
        Some(TransactionStatus::Waiting | TransactionStatus::Confirm) => {}
        _ => {
            return Err(AppError::invalid(format!(
                "Transaction cannot be cancelled from status {}",
                t.status
            )))
        }
    }
    t.status = TransactionStatus::Cancel.as_str().to_string();
    t.update_time = now;
    Ok(())
}

/// Administrative override; only the label itself is validated.
pub fn apply_status(t: &mut Transaction, status: &str, now: OffsetDateTime) -> Result<TransactionStatus, AppError> {
    let status: TransactionStatus = status.parse().map_err(|e| AppError::bad_request(format!("{e}")))?;
    t.status = status.as_str().to_string();
    t.update_time = now;
    Ok(status)
}

fn not_found() -> AppError {
    AppError::not_found("Transaction not found")
}

pub async fn create_transaction(db: &PgPool, customer: i64, input: CreateTransaction) -> AppResult<Transaction> {
    input.validate()?;
    let mut tx = db.begin().await?;
    let item = items::repo::find(&mut *tx, input.id_item)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;

    let created = repo::insert_tx(
        &mut tx,
        item.id_item,
        customer,
        item.id_user,
        input.price,
        input.address.trim(),
        &input.receipt,
    )
    .await?;
    tx.commit().await?;

    info!(
        transaction_id = created.id_transaction,
        item_id = item.id_item,
        customer,
        seller = item.id_user,
        "transaction created"
    );
    Ok(created)
}

/// Locks the row, applies `change`, and writes the result back in one transaction.
pub async fn mutate<F>(db: &PgPool, id: i64, change: F) -> AppResult<Transaction>
where
    F: FnOnce(&mut Transaction, OffsetDateTime) -> Result<(), AppError>,
{
    let mut tx = db.begin().await?;
    let mut t = repo::lock_tx(&mut tx, id).await?.ok_or_else(not_found)?;
    let from = t.status.clone();

    change(&mut t, OffsetDateTime::now_utc())?;
    let saved = repo::save_tx(&mut tx, &t).await?;
    tx.commit().await?;

    info!(transaction_id = id, from = %from, to = %saved.status, "transaction updated");
    Ok(saved)
}


#[cfg(test)]
mod store_tests {
    use super::*;
    use crate::db::testing;

    fn order(id_item: i64) -> CreateTransaction {
        CreateTransaction {
            id_item,
            price: 12.0,
            address: " 1 Main St ".into(),
            receipt: String::new(),
        }
    }

    #[tokio::test]
    async fn customer_flow_through_mutate() {
        let Some(db) = testing::pool().await else { return };
        let seller = testing::user(&db).await;
        let customer = testing::user(&db).await;
        let item = testing::item(&db, seller.id).await;

        let created = create_transaction(&db, customer.id, order(item.id_item)).await.unwrap();
        assert_eq!(created.id_user_seller, Some(seller.id));
        assert_eq!(created.id_user_customer, customer.id);
        assert_eq!(created.status, "Waiting");
        assert_eq!(created.address, "1 Main St");

        let id = created.id_transaction;
        let moved = mutate(&db, id, |t, now| apply_address(t, customer.id, "2 Side St".into(), now))
            .await
            .unwrap();
        assert_eq!(moved.address, "2 Side St");

        let err = mutate(&db, id, |t, now| apply_address(t, seller.id, "x".into(), now))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let cancelled = mutate(&db, id, |t, now| apply_cancel(t, customer.id, now)).await.unwrap();
        assert_eq!(cancelled.status, "Cancel");

        let err = mutate(&db, id, |t, now| apply_address(t, customer.id, "3 Late St".into(), now))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidOperation(_)));
        let stored = repo::find(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.address, "2 Side St");
        assert_eq!(stored.status, "Cancel");
    }

    #[tokio::test]
    async fn missing_item_or_transaction_is_not_found() {
        let Some(db) = testing::pool().await else { return };
        let customer = testing::user(&db).await;

        let err = create_transaction(&db, customer.id, order(i64::MAX)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = mutate(&db, i64::MAX, |t, now| apply_cancel(t, customer.id, now))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
