use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Lifecycle label of a freshly listed item, and the one a closed request reverts to.
pub const STATUS_AVAILABLE: &str = "Available";
/// Label while an exchange request is open on the item.
pub const STATUS_IN_PROGRESS: &str = "Progress";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id_item: i64,
    pub id_user: i64,
    pub name_item: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    pub status: String,
    pub detail: Option<serde_json::Value>,
    pub category_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Item joined with its category, tags and owner names.
#[derive(Debug, Clone, FromRow)]
pub struct ItemViewRow {
    #[sqlx(flatten)]
    pub item: Item,
    pub name_category: Option<String>,
    pub category_image: Option<String>,
    pub tag_ids: Vec<i64>,
    pub tag_names: Vec<String>,
    pub owner_username: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
}

#[cfg(test)]
impl Item {
    pub(crate) fn sample(id_item: i64, id_user: i64, status: &str) -> Item {
        let now = OffsetDateTime::now_utc();
        Item {
            id_item,
            id_user,
            name_item: "Lamp".into(),
            description: "desk lamp".into(),
            price: 10.0,
            images: vec!["data:image/png;base64,AAAA".into()],
            status: status.into(),
            detail: None,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
