use sqlx::{PgExecutor, PgPool};

use crate::auth::repo_types::User;

pub(crate) const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash, \
     role, is_active, register_date, updated_date, last_login_date";

impl User {
    pub async fn find_by_id<'e>(db: impl PgExecutor<'e>, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Looks the login name up as a username first, then as an email.
    pub async fn find_by_login(db: &PgPool, login: &str) -> sqlx::Result<Option<User>> {
        let by_username = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(login)
        .fetch_optional(db)
        .await?;
        if by_username.is_some() {
            return Ok(by_username);
        }
        Self::find_by_email(db, &login.trim().to_lowercase()).await
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn touch_last_login(db: &PgPool, id: i64) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_date = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::{auth::Role, db::testing};

    use super::*;

    #[tokio::test]
    async fn login_matches_exact_username_or_normalized_email() {
        let Some(db) = testing::pool().await else { return };
        let user = testing::user_with(&db, Role::User, "unusable").await;

        let by_name = User::find_by_login(&db, &user.username).await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let shouted = format!("  {}  ", user.email.to_uppercase());
        let by_email = User::find_by_login(&db, &shouted).await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        // usernames are case-sensitive
        let upper_name = user.username.to_uppercase();
        assert!(User::find_by_login(&db, &upper_name).await.unwrap().is_none());
    }
}
