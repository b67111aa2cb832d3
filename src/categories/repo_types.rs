use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id_category: i64,
    pub name_category: String,
    pub category_image: String,
}
