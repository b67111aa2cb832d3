use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Credentials of the administrator created at startup when none exists
/// under that username.
#[derive(Clone, Deserialize)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub admin: Option<AdminSeed>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "rubhew".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "rubhew-users".into()),
            // 5 hours
            ttl_minutes: env_or("ACCESS_TOKEN_EXPIRE_MINUTES", 5 * 60),
            // 7 days
            refresh_ttl_minutes: env_or("REFRESH_TOKEN_EXPIRE_MINUTES", 7 * 24 * 60),
        };
        Ok(Self {
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            jwt,
            admin: admin_seed_from(|key| std::env::var(key).ok()),
        })
    }
}

/// All of `ADMIN_USERNAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`, or nothing.
fn admin_seed_from(get: impl Fn(&str) -> Option<String>) -> Option<AdminSeed> {
    let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
    Some(AdminSeed {
        username: non_empty("ADMIN_USERNAME")?,
        email: non_empty("ADMIN_EMAIL")?,
        password: non_empty("ADMIN_PASSWORD")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_missing_or_garbage() {
        assert_eq!(env_or("RUBHEW_TEST_SURELY_UNSET_VAR", 42i64), 42);
        std::env::set_var("RUBHEW_TEST_GARBAGE_VAR", "not-a-number");
        assert_eq!(env_or("RUBHEW_TEST_GARBAGE_VAR", 7u32), 7);
        std::env::set_var("RUBHEW_TEST_NUMBER_VAR", "15");
        assert_eq!(env_or("RUBHEW_TEST_NUMBER_VAR", 7u32), 15);
    }

    #[test]
    fn admin_seed_needs_all_three_values() {
        let full = |key: &str| match key {
            "ADMIN_USERNAME" => Some("root".to_string()),
            "ADMIN_EMAIL" => Some("root@example.com".to_string()),
            "ADMIN_PASSWORD" => Some("change-me-now".to_string()),
            _ => None,
        };
        let seed = admin_seed_from(full).unwrap();
        assert_eq!(seed.username, "root");
        assert!(!format!("{seed:?}").contains("change-me-now"));

        let no_password = |key: &str| if key == "ADMIN_PASSWORD" { Some("  ".to_string()) } else { full(key) };
        assert!(admin_seed_from(no_password).is_none());
        assert!(admin_seed_from(|_| None).is_none());
    }
}
