use serde::Deserialize;

use super::repo_types::Category;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name_category: String,
    #[serde(default)]
    pub category_image: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    pub name_category: Option<String>,
    pub category_image: Option<String>,
}

pub(crate) fn clean_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    Ok(name.to_string())
}

impl CategoryPatch {
    pub fn apply(self, category: &mut Category) -> Result<(), AppError> {
        if let Some(name) = self.name_category {
            category.name_category = clean_name(&name)?;
        }
        if let Some(image) = self.category_image {
            category.category_image = image;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_renames_and_keeps_image() {
        let mut c = Category {
            id_category: 1,
            name_category: "Books".into(),
            category_image: "img".into(),
        };
        CategoryPatch {
            name_category: Some("  Comics ".into()),
            ..Default::default()
        }
        .apply(&mut c)
        .unwrap();
        assert_eq!(c.name_category, "Comics");
        assert_eq!(c.category_image, "img");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(clean_name("   ").is_err());
    }
}
