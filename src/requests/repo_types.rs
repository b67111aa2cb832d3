use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// A user's proposal to acquire another user's item.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Request {
    pub id: i64,
    pub id_sent: i64,
    pub id_receive: i64,
    pub id_item: i64,
    pub message: Option<String>,
    pub res_message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct RequestDetailRow {
    #[sqlx(flatten)]
    pub request: Request,
    pub sender_username: String,
    pub sender_email: String,
    pub sender_first_name: String,
    pub sender_last_name: String,
    pub receiver_username: String,
    pub receiver_email: String,
    pub receiver_first_name: String,
    pub receiver_last_name: String,
    pub item_name: Option<String>,
    pub item_images: Option<Vec<String>>,
    pub item_status: Option<String>,
}

#[cfg(test)]
impl Request {
    pub(crate) fn sample(id: i64, id_sent: i64, id_receive: i64, id_item: i64) -> Request {
        let created = OffsetDateTime::now_utc() - time::Duration::hours(1);
        Request {
            id,
            id_sent,
            id_receive,
            id_item,
            message: Some("interested".into()),
            res_message: None,
            create_time: created,
            update_time: created,
        }
    }
}
