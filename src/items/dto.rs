use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::repo_types::{Item, ItemViewRow, STATUS_AVAILABLE};
use crate::{error::AppError, users::dto::UserRef};

fn default_status() -> String {
    STATUS_AVAILABLE.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub name_item: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub detail: Option<serde_json::Value>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// Keeps an explicit `null` apart from an absent field.
fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Partial update of an owned item. `None` leaves a field alone; `tags`
/// replaces the whole tag set when present. `detail` and `category_id`
/// are cleared by an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemPatch {
    pub name_item: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub detail: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<i64>>,
    pub tags: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub name_category: String,
    pub category_image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagRef {
    pub id_tags: i64,
    pub name_tags: String,
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub id_item: i64,
    pub id_user: i64,
    pub name_item: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    pub status: String,
    pub detail: Option<serde_json::Value>,
    pub category_id: Option<i64>,
    pub category: Option<CategoryRef>,
    pub tags: Vec<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserRef>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ItemView {
    /// Builds the read-time view; `with_owner` adds the owner's names.
    pub fn from_row(row: ItemViewRow, with_owner: bool) -> Self {
        let ItemViewRow {
            item,
            name_category,
            category_image,
            tag_ids,
            tag_names,
            owner_username,
            owner_first_name,
            owner_last_name,
        } = row;

        let category = name_category.map(|name_category| CategoryRef {
            name_category,
            category_image: category_image.unwrap_or_default(),
        });
        let tags = tag_ids
            .into_iter()
            .zip(tag_names)
            .map(|(id_tags, name_tags)| TagRef { id_tags, name_tags })
            .collect();
        let user_profile = with_owner.then(|| UserRef {
            username: owner_username,
            first_name: owner_first_name,
            last_name: owner_last_name,
        });

        Self {
            id_item: item.id_item,
            id_user: item.id_user,
            name_item: item.name_item,
            description: item.description,
            price: item.price,
            images: item.images,
            status: item.status,
            detail: item.detail,
            category_id: item.category_id,
            category,
            tags,
            user_profile,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

fn check_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::bad_request("name_item must not be empty"));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::bad_request("price must be a non-negative number"));
    }
    Ok(())
}

fn check_images(images: &[String]) -> Result<(), AppError> {
    if images.is_empty() {
        return Err(AppError::bad_request("images must be non-empty"));
    }
    Ok(())
}

fn dedup(ids: &mut Vec<i64>) {
    ids.sort_unstable();
    ids.dedup();
}

impl CreateItem {
    pub fn validate(&mut self) -> Result<(), AppError> {
        check_name(&self.name_item)?;
        check_price(self.price)?;
        check_images(&self.images)?;
        dedup(&mut self.tags);
        Ok(())
    }
}

impl ItemPatch {
    /// Merges every scalar field into `item` and hands back the tag set, if any.
    pub fn apply(self, item: &mut Item) -> Result<Option<Vec<i64>>, AppError> {
        if let Some(name_item) = self.name_item {
            check_name(&name_item)?;
            item.name_item = name_item;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(price) = self.price {
            check_price(price)?;
            item.price = price;
        }
        if let Some(images) = self.images {
            check_images(&images)?;
            item.images = images;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(detail) = self.detail {
            item.detail = detail;
        }
        if let Some(category_id) = self.category_id {
            item.category_id = category_id;
        }
        Ok(self.tags.map(|mut tags| {
            dedup(&mut tags);
            tags
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id_item: i64, id_user: i64, status: &str) -> Item {
        Item::sample(id_item, id_user, status)
    }

    #[test]
    fn create_defaults_status_to_available() {
        let payload: CreateItem = serde_json::from_str(
            r#"{"name_item":"Lamp","description":"d","price":3.5,"images":["x"],"tags":[3,1,3]}"#,
        )
        .unwrap();
        let mut payload = payload;
        payload.validate().unwrap();
        assert_eq!(payload.status, "Available");
        assert_eq!(payload.tags, vec![1, 3]);
    }

    #[test]
    fn create_rejects_bad_input() {
        let mut payload = CreateItem {
            name_item: "Lamp".into(),
            description: String::new(),
            price: -1.0,
            images: vec!["x".into()],
            status: default_status(),
            detail: None,
            category_id: None,
            tags: vec![],
        };
        assert!(payload.validate().is_err());
        payload.price = 1.0;
        payload.images.clear();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn patch_merges_and_returns_tags() {
        let mut it = item(1, 1, "Available");
        let patch = ItemPatch {
            price: Some(12.5),
            status: Some("Sold".into()),
            tags: Some(vec![2, 2, 1]),
            ..Default::default()
        };
        let tags = patch.apply(&mut it).unwrap();
        assert_eq!(it.price, 12.5);
        assert_eq!(it.status, "Sold");
        assert_eq!(it.name_item, "Lamp");
        assert_eq!(tags, Some(vec![1, 2]));
    }

    #[test]
    fn explicit_null_clears_category_and_detail() {
        let mut it = item(1, 1, "Available");
        it.category_id = Some(3);
        it.detail = Some(serde_json::json!({"size": "M"}));

        let keep: ItemPatch = serde_json::from_str(r#"{"price": 2.0}"#).unwrap();
        keep.apply(&mut it).unwrap();
        assert_eq!(it.category_id, Some(3));
        assert!(it.detail.is_some());

        let clear: ItemPatch = serde_json::from_str(r#"{"category_id": null, "detail": null}"#).unwrap();
        clear.apply(&mut it).unwrap();
        assert_eq!(it.category_id, None);
        assert_eq!(it.detail, None);

        let set: ItemPatch = serde_json::from_str(r#"{"category_id": 9}"#).unwrap();
        set.apply(&mut it).unwrap();
        assert_eq!(it.category_id, Some(9));
    }

    #[test]
    fn patch_without_tags_keeps_tag_set() {
        let mut it = item(1, 1, "Available");
        assert_eq!(ItemPatch::default().apply(&mut it).unwrap(), None);
    }

    #[test]
    fn view_denormalizes_category_tags_and_owner() {
        let row = ItemViewRow {
            item: item(4, 2, "Available"),
            name_category: Some("Home".into()),
            category_image: Some("home.png".into()),
            tag_ids: vec![1, 5],
            tag_names: vec!["light".into(), "vintage".into()],
            owner_username: "bob".into(),
            owner_first_name: "Bob".into(),
            owner_last_name: "B".into(),
        };

        let public = ItemView::from_row(row.clone(), true);
        assert_eq!(public.category.as_ref().unwrap().name_category, "Home");
        assert_eq!(public.tags.len(), 2);
        assert_eq!(public.tags[1].name_tags, "vintage");
        assert_eq!(public.user_profile.as_ref().unwrap().username, "bob");

        let own = ItemView::from_row(row, false);
        assert!(own.user_profile.is_none());
        let json = serde_json::to_value(&own).unwrap();
        assert!(json.get("user_profile").is_none());
    }

    #[test]
    fn view_without_category() {
        let row = ItemViewRow {
            item: item(4, 2, "Available"),
            name_category: None,
            category_image: None,
            tag_ids: vec![],
            tag_names: vec![],
            owner_username: "bob".into(),
            owner_first_name: "Bob".into(),
            owner_last_name: "B".into(),
        };
        let view = ItemView::from_row(row, true);
        assert!(view.category.is_none());
        assert!(view.tags.is_empty());
    }
}
