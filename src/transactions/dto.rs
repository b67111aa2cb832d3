use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateTransaction {
    pub id_item: i64,
    pub price: f64,
    pub address: String,
    #[serde(default)]
    pub receipt: String,
}

impl CreateTransaction {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::bad_request("Price must be a non-negative number"));
        }
        if self.address.trim().is_empty() {
            return Err(AppError::bad_request("Address is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AddressUpdate {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptUpdate {
    pub receipt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_defaults_to_empty() {
        let input: CreateTransaction =
            serde_json::from_value(serde_json::json!({"id_item": 1, "price": 3.5, "address": "here"})).unwrap();
        assert_eq!(input.receipt, "");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn rejects_negative_price_and_blank_address() {
        let neg = CreateTransaction { id_item: 1, price: -1.0, address: "x".into(), receipt: String::new() };
        assert!(matches!(neg.validate(), Err(AppError::BadRequest(_))));
        let blank = CreateTransaction { id_item: 1, price: 1.0, address: "  ".into(), receipt: String::new() };
        assert!(matches!(blank.validate(), Err(AppError::BadRequest(_))));
    }
}
