use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TagInput {
    pub name_tags: String,
}

impl TagInput {
    pub fn name(&self) -> Result<&str, AppError> {
        let name = self.name_tags.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("name_tags must not be empty"));
        }
        Ok(name)
    }
}
