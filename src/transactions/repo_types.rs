use std::{fmt, str::FromStr};

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionStatus {
    Waiting,
    Confirm,
    Cancel,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Waiting => "Waiting",
            TransactionStatus::Confirm => "Confirm",
            TransactionStatus::Cancel => "Cancel",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Waiting" => Ok(TransactionStatus::Waiting),
            "Confirm" => Ok(TransactionStatus::Confirm),
            "Cancel" => Ok(TransactionStatus::Cancel),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Payment/fulfillment record between a customer and an item's seller.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Transaction {
    pub id_transaction: i64,
    pub id_item: i64,
    pub id_user_customer: i64,
    /// Cleared when the seller's account is removed.
    pub id_user_seller: Option<i64>,
    pub price: f64,
    pub address: String,
    pub receipt: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}

impl Transaction {
    /// Stored labels outside the vocabulary read as `None`.
    pub fn status(&self) -> Option<TransactionStatus> {
        self.status.parse().ok()
    }
}

#[cfg(test)]
impl Transaction {
    pub(crate) fn sample(id_transaction: i64, customer: i64, seller: i64, status: TransactionStatus) -> Transaction {
        let created = OffsetDateTime::now_utc() - time::Duration::hours(1);
        Transaction {
            id_transaction,
            id_item: 100,
            id_user_customer: customer,
            id_user_seller: Some(seller),
            price: 25.0,
            address: "1 Main St".into(),
            receipt: String::new(),
            status: status.as_str().into(),
            create_time: created,
            update_time: created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_vocabulary_is_closed() {
        for s in ["Waiting", "Confirm", "Cancel"] {
            let parsed: TransactionStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("Shipped".parse::<TransactionStatus>().is_err());
        assert!("waiting".parse::<TransactionStatus>().is_err());
    }
}
