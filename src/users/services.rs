use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};

use super::{
    dto::{RegisterUser, UserPatch},
    repo,
};
use crate::{
    auth::{password::hash_password, Role, User},
    config::AdminSeed,
    error::{AppError, AppResult},
    profiles,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn check_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request("Password too short"));
    }
    Ok(())
}

fn check_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(AppError::bad_request("Invalid username"));
    }
    Ok(())
}

/// Normalizes and validates a registration payload in place.
pub(crate) fn validate_registration(payload: &mut RegisterUser) -> Result<(), AppError> {
    payload.email = normalize_email(&payload.email);
    payload.username = payload.username.trim().to_string();
    if !is_valid_email(&payload.email) {
        return Err(AppError::bad_request("Invalid email"));
    }
    check_username(&payload.username)?;
    check_password(&payload.password)
}

impl UserPatch {
    /// Merges every provided field into `user`; returns whether anything changed.
    pub fn apply(self, user: &mut User) -> Result<bool, AppError> {
        let mut changed = false;
        if let Some(email) = self.email {
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                return Err(AppError::bad_request("Invalid email"));
            }
            changed |= email != user.email;
            user.email = email;
        }
        if let Some(username) = self.username {
            let username = username.trim().to_string();
            check_username(&username)?;
            changed |= username != user.username;
            user.username = username;
        }
        if let Some(first_name) = self.first_name {
            changed |= first_name != user.first_name;
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            changed |= last_name != user.last_name;
            user.last_name = last_name;
        }
        Ok(changed)
    }
}

/// Creates the configured administrator, profile included. Returns `None`
/// when the username is already taken: an existing account is never
/// promoted, whatever its role.
pub async fn seed_admin(db: &PgPool, seed: &AdminSeed) -> AppResult<Option<User>> {
    let mut payload = RegisterUser {
        email: seed.email.clone(),
        username: seed.username.clone(),
        first_name: "Admin".into(),
        last_name: String::new(),
        password: seed.password.clone(),
    };
    validate_registration(&mut payload)?;

    if let Some(existing) = repo::find_by_username(db, &payload.username).await? {
        if existing.role() < Role::Admin {
            warn!(user_id = existing.id, "admin seed username belongs to a regular user; not promoting");
        }
        return Ok(None);
    }
    if repo::username_or_email_taken(db, &payload.username, &payload.email, None).await? {
        warn!(email = %payload.email, "admin seed email already registered; skipping");
        return Ok(None);
    }

    let hash = hash_password(&payload.password)?;
    let mut tx = db.begin().await?;
    let admin = repo::insert_user_tx(
        &mut tx,
        &payload.email,
        &payload.username,
        &payload.first_name,
        &payload.last_name,
        &hash,
        Role::Admin,
    )
    .await?;
    profiles::repo::insert_empty_tx(&mut tx, admin.id).await?;
    tx.commit().await?;

    info!(user_id = admin.id, username = %admin.username, "admin account seeded");
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::guards::tests::user;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("sp ace@b.co"));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn registration_is_normalized_and_checked() {
        let mut payload = RegisterUser {
            email: "  Alice@Example.COM ".into(),
            username: " alice ".into(),
            first_name: "Alice".into(),
            last_name: "A".into(),
            password: "longenough".into(),
        };
        validate_registration(&mut payload).unwrap();
        assert_eq!(payload.email, "alice@example.com");
        assert_eq!(payload.username, "alice");

        payload.password = "short".into();
        assert!(matches!(validate_registration(&mut payload), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn patch_touches_only_provided_fields() {
        let mut u = user(3, "user", true);
        let patch = UserPatch {
            first_name: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(patch.apply(&mut u).unwrap());
        assert_eq!(u.first_name, "Renamed");
        assert_eq!(u.last_name, "Last");
        assert_eq!(u.email, "u3@example.com");
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut u = user(3, "user", true);
        assert!(!UserPatch::default().apply(&mut u).unwrap());
    }

    #[test]
    fn patch_rejects_bad_email() {
        let mut u = user(3, "user", true);
        let patch = UserPatch {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(patch.apply(&mut u).is_err());
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;
    use crate::{auth::password::verify_password, db::testing};

    fn seed(username: &str) -> AdminSeed {
        AdminSeed {
            username: username.to_string(),
            email: format!("{}@Example.com", username),
            password: "admin-password".into(),
        }
    }

    #[tokio::test]
    async fn seeding_creates_one_admin_with_profile() {
        let Some(db) = testing::pool().await else { return };
        let name = testing::unique("admin");

        let admin = seed_admin(&db, &seed(&name)).await.unwrap().unwrap();
        assert_eq!(admin.role(), Role::Admin);
        assert_eq!(admin.email, format!("{name}@example.com"));
        assert!(verify_password("admin-password", &admin.password_hash).unwrap());
        assert!(profiles::repo::find_by_user(&db, admin.id).await.unwrap().is_some());

        assert!(seed_admin(&db, &seed(&name)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seeding_never_promotes_an_existing_account() {
        let Some(db) = testing::pool().await else { return };
        let squatter = testing::user(&db).await;

        assert!(seed_admin(&db, &seed(&squatter.username)).await.unwrap().is_none());
        let stored = User::find_by_id(&db, squatter.id).await.unwrap().unwrap();
        assert_eq!(stored.role(), Role::User);
    }

    #[tokio::test]
    async fn seeding_validates_credentials() {
        let Some(db) = testing::pool().await else { return };
        let mut weak = seed(&testing::unique("admin"));
        weak.password = "short".into();
        assert!(matches!(seed_admin(&db, &weak).await, Err(AppError::BadRequest(_))));
    }
}
