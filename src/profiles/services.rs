use super::{dto::ProfilePatch, repo_types::Profile};
use crate::error::AppError;

/// Which follow set of a profile an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowList {
    Tags,
    Categories,
}

impl FollowList {
    fn ids_mut(self, profile: &mut Profile) -> &mut Vec<i64> {
        match self {
            FollowList::Tags => &mut profile.followed_tags,
            FollowList::Categories => &mut profile.followed_categories,
        }
    }
}

/// Adds `id` to the set; returns false if it was already there.
pub fn follow(profile: &mut Profile, list: FollowList, id: i64) -> bool {
    let ids = list.ids_mut(profile);
    if ids.contains(&id) {
        return false;
    }
    ids.push(id);
    true
}

/// Removes `id` from the set; returns false if it was not there.
pub fn unfollow(profile: &mut Profile, list: FollowList, id: i64) -> bool {
    let ids = list.ids_mut(profile);
    let before = ids.len();
    ids.retain(|x| *x != id);
    ids.len() != before
}

impl ProfilePatch {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(gender) = self.gender {
            profile.gender = Some(gender);
        }
        if let Some(address) = self.address {
            profile.address = Some(address);
        }
        if let Some(birthday) = self.birthday {
            profile.birthday = Some(birthday);
        }
        if let Some(phone_number) = self.phone_number {
            profile.phone_number = Some(phone_number);
        }
        if let Some(profile_image) = self.profile_image {
            profile.profile_image = Some(profile_image);
        }
    }
}

pub fn page_count(total: i64, size_per_page: i64) -> i64 {
    if size_per_page <= 0 || total <= 0 {
        return 0;
    }
    total / size_per_page + i64::from(total % size_per_page != 0)
}

/// Row offset of a 1-based page; rejects non-positive input and overflow.
pub fn page_offset(page: i64, size_per_page: i64) -> Result<i64, AppError> {
    if page < 1 || size_per_page < 1 {
        return Err(AppError::bad_request("page and size_per_page must be positive"));
    }
    (page - 1)
        .checked_mul(size_per_page)
        .ok_or_else(|| AppError::bad_request("page is out of range"))
}
