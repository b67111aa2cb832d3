use sqlx::{PgPool, Postgres, Transaction};

use super::repo_types::{Request, RequestDetailRow};

const REQUEST_COLUMNS: &str =
    "id, id_sent, id_receive, id_item, message, res_message, create_time, update_time";

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    id_sent: i64,
    id_receive: i64,
    id_item: i64,
    message: Option<&str>,
) -> sqlx::Result<Request> {
    sqlx::query_as::<_, Request>(&format!(
        r#"
        INSERT INTO requests (id_sent, id_receive, id_item, message, create_time, update_time)
        VALUES ($1, $2, $3, $4, now(), now())
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(id_sent)
    .bind(id_receive)
    .bind(id_item)
    .bind(message)
    .fetch_one(&mut **tx)
    .await
}

pub async fn lock_tx(tx: &mut Transaction<'_, Postgres>, id: i64) -> sqlx::Result<Option<Request>> {
    sqlx::query_as::<_, Request>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

/// Writes back both messages and `update_time`.
pub async fn save_tx(tx: &mut Transaction<'_, Postgres>, request: &Request) -> sqlx::Result<Request> {
    sqlx::query_as::<_, Request>(&format!(
        r#"
        UPDATE requests SET message = $2, res_message = $3, update_time = $4
         WHERE id = $1
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(request.id)
    .bind(&request.message)
    .bind(&request.res_message)
    .bind(request.update_time)
    .fetch_one(&mut **tx)
    .await
}

pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM requests WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<Request>> {
    sqlx::query_as::<_, Request>(&format!("SELECT {REQUEST_COLUMNS} FROM requests ORDER BY id"))
        .fetch_all(db)
        .await
}

/// Requests the user sent or received.
pub async fn list_for_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Request>> {
    sqlx::query_as::<_, Request>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM requests WHERE id_sent = $1 OR id_receive = $1 ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_detail(db: &PgPool, id: i64) -> sqlx::Result<Option<RequestDetailRow>> {
    sqlx::query_as::<_, RequestDetailRow>(
        r#"
        SELECT r.id, r.id_sent, r.id_receive, r.id_item, r.message, r.res_message,
               r.create_time, r.update_time,
               s.username AS sender_username, s.email AS sender_email,
               s.first_name AS sender_first_name, s.last_name AS sender_last_name,
               v.username AS receiver_username, v.email AS receiver_email,
               v.first_name AS receiver_first_name, v.last_name AS receiver_last_name,
               i.name_item AS item_name, i.images AS item_images, i.status AS item_status
          FROM requests r
          JOIN users s ON s.id = r.id_sent
          JOIN users v ON v.id = r.id_receive
          LEFT JOIN items i ON i.id_item = r.id_item
         WHERE r.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
