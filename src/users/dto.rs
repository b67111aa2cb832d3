use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::{Role, User};

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub register_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_date: Option<OffsetDateTime>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        let role = u.role();
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            role,
            is_active: u.is_active,
            register_date: u.register_date,
            last_login_date: u.last_login_date,
        }
    }
}

/// Name-only view of a user embedded in other resources.
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Partial update of the caller's own account. `None` leaves a field alone.
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub new_role: String,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}
