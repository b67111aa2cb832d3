use serde::{Deserialize, Serialize};

use super::repo_types::Profile;

/// Partial update of the caller's profile. `None` leaves a field alone.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub gender: Option<String>,
    pub address: Option<String>,
    pub birthday: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size_per_page: i64,
}
fn default_page() -> i64 { 1 }
fn default_size() -> i64 { 50 }

#[derive(Debug, Serialize)]
pub struct ProfileList {
    pub profiles: Vec<Profile>,
    pub page: i64,
    pub page_count: i64,
    pub size_per_page: i64,
}
