use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub birthday: Option<String>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub followed_tags: Vec<i64>,
    pub followed_categories: Vec<i64>,
}
