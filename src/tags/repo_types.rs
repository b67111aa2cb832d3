use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id_tags: i64,
    pub name_tags: String,
}
