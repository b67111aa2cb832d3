use serde::{Deserialize, Serialize};

use super::repo_types::{Request, RequestDetailRow};

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub id_item: i64,
    pub message: Option<String>,
}

/// Sender edits `message`, receiver edits `res_message`.
#[derive(Debug, Default, Deserialize)]
pub struct RequestUpdate {
    pub message: Option<String>,
    pub res_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RespondRequest {
    pub res_message: Option<String>,
    /// Free-text item lifecycle label, e.g. "Sold".
    pub item_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct ItemDetail {
    pub id_item: i64,
    pub name_item: String,
    pub images: Vec<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: Request,
    pub sender: UserDetail,
    pub receiver: UserDetail,
    /// `None` once the item has been deleted.
    pub item: Option<ItemDetail>,
}

impl From<RequestDetailRow> for RequestDetail {
    fn from(r: RequestDetailRow) -> Self {
        let item = match (r.item_name, r.item_status) {
            (Some(name_item), Some(status)) => Some(ItemDetail {
                id_item: r.request.id_item,
                name_item,
                images: r.item_images.unwrap_or_default(),
                status,
            }),
            _ => None,
        };
        Self {
            sender: UserDetail {
                username: r.sender_username,
                email: r.sender_email,
                first_name: r.sender_first_name,
                last_name: r.sender_last_name,
            },
            receiver: UserDetail {
                username: r.receiver_username,
                email: r.receiver_email,
                first_name: r.receiver_first_name,
                last_name: r.receiver_last_name,
            },
            item,
            request: r.request,
        }
    }
}
