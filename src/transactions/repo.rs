use sqlx::{PgExecutor, PgPool, Postgres};

use super::repo_types::Transaction;

const TRANSACTION_COLUMNS: &str = "id_transaction, id_item, id_user_customer, id_user_seller, price, \
     address, receipt, status, create_time, update_time";

pub async fn insert_tx(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    id_item: i64,
    customer: i64,
    seller: i64,
    price: f64,
    address: &str,
    receipt: &str,
) -> sqlx::Result<Transaction> {
    sqlx::query_as::<_, Transaction>(&format!(
        r#"
        INSERT INTO transactions
               (id_item, id_user_customer, id_user_seller, price, address, receipt, status, create_time, update_time)
        VALUES ($1, $2, $3, $4, $5, $6, 'Waiting', now(), now())
        RETURNING {TRANSACTION_COLUMNS}
        "#
    ))
    .bind(id_item)
    .bind(customer)
    .bind(seller)
    .bind(price)
    .bind(address)
    .bind(receipt)
    .fetch_one(&mut **tx)
    .await
}

pub async fn find<'e>(db: impl PgExecutor<'e>, id: i64) -> sqlx::Result<Option<Transaction>> {
    sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id_transaction = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn lock_tx(tx: &mut sqlx::Transaction<'_, Postgres>, id: i64) -> sqlx::Result<Option<Transaction>> {
    sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id_transaction = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

/// Writes back the mutable fields: address, receipt, status and `update_time`.
pub async fn save_tx(tx: &mut sqlx::Transaction<'_, Postgres>, t: &Transaction) -> sqlx::Result<Transaction> {
    sqlx::query_as::<_, Transaction>(&format!(
        r#"
        UPDATE transactions
           SET address = $2, receipt = $3, status = $4, update_time = $5
         WHERE id_transaction = $1
        RETURNING {TRANSACTION_COLUMNS}
        "#
    ))
    .bind(t.id_transaction)
    .bind(&t.address)
    .bind(&t.receipt)
    .bind(&t.status)
    .bind(t.update_time)
    .fetch_one(&mut **tx)
    .await
}

pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM transactions WHERE id_transaction = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<Transaction>> {
    sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY id_transaction"
    ))
    .fetch_all(db)
    .await
}

pub async fn list_for_customer(db: &PgPool, customer: i64) -> sqlx::Result<Vec<Transaction>> {
    sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id_user_customer = $1 ORDER BY id_transaction"
    ))
    .bind(customer)
    .fetch_all(db)
    .await
}
