//! Composable checks over an already resolved identity.

use crate::{auth::repo_types::User, auth::role::Role, error::AppError};

pub fn require_active(user: &User) -> Result<(), AppError> {
    if !user.is_active {
        return Err(AppError::InactiveUser);
    }
    Ok(())
}

pub fn require_role_at_least(user: &User, min: Role) -> Result<(), AppError> {
    if user.role() < min {
        tracing::debug!(user_id = user.id, role = %user.role(), required = %min, "role too low");
        return Err(AppError::forbidden("The user doesn't have enough privileges"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::OffsetDateTime;

    pub(crate) fn user(id: i64, role: &str, is_active: bool) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id,
            email: format!("u{id}@example.com"),
            username: format!("u{id}"),
            first_name: "First".into(),
            last_name: "Last".into(),
            password_hash: String::new(),
            role: role.into(),
            is_active,
            register_date: now,
            updated_date: now,
            last_login_date: None,
        }
    }

    #[test]
    fn inactive_users_are_rejected() {
        assert!(require_active(&user(1, "user", true)).is_ok());
        assert!(matches!(
            require_active(&user(1, "user", false)),
            Err(AppError::InactiveUser)
        ));
    }

    #[test]
    fn role_at_least_follows_privilege_order() {
        assert!(require_role_at_least(&user(1, "admin", true), Role::Admin).is_ok());
        assert!(require_role_at_least(&user(1, "admin", true), Role::User).is_ok());
        assert!(matches!(
            require_role_at_least(&user(1, "user", true), Role::Admin),
            Err(AppError::Forbidden(_))
        ));
        // unrecognised roles never reach admin
        assert!(require_role_at_least(&user(1, "root", true), Role::Admin).is_err());
    }
}
