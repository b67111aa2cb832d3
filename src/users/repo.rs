use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::auth::{repo::USER_COLUMNS, Role, User};

pub async fn username_or_email_taken(
    db: &PgPool,
    username: &str,
    email: &str,
    except_id: Option<i64>,
) -> sqlx::Result<bool> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
             WHERE (username = $1 OR email = $2)
               AND ($3::BIGINT IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(except_id)
    .fetch_one(db)
    .await?;
    Ok(taken)
}

pub async fn insert_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
    password_hash: &str,
    role: Role,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, username, first_name, last_name, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(email)
    .bind(username)
    .bind(first_name)
    .bind(last_name)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(&mut **tx)
    .await
}

pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn list_users(db: &PgPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(db)
        .await
}

/// Writes back every mutable identity field of `user`.
pub async fn save_identity<'e>(db: impl PgExecutor<'e>, user: &User) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
           SET email = $2, username = $3, first_name = $4, last_name = $5, updated_date = now()
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .fetch_one(db)
    .await
}

pub async fn set_password(db: &PgPool, id: i64, password_hash: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_date = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(())
}

/// Returns `false` when no such user exists.
pub async fn set_role(db: &PgPool, id: i64, role: Role) -> sqlx::Result<bool> {
    let res = sqlx::query("UPDATE users SET role = $2, updated_date = now() WHERE id = $1")
        .bind(id)
        .bind(role.as_str())
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_user(db: &PgPool, id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
