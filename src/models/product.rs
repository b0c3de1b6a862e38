use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product record persisted in redb
///
/// The price is stored in integer minor units (cents) so the stored form is
/// exact; `Decimal` is materialized at the edges for arithmetic and JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub store_id: String,
    pub name: String,
    pub price_cents: i64,
    /// When the product was created (Unix timestamp)
    pub created_at: i64,
}

/// Product model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub price: Decimal,
    pub created_at: i64,
}

impl Product {
    pub fn from_record(id: String, record: ProductRecord) -> Self {
        Self {
            id,
            store_id: record.store_id,
            name: record.name,
            price: cents_to_decimal(record.price_cents),
            created_at: record.created_at,
        }
    }

    /// Validate that a product ID is a UUID string
    pub fn validate_id(id: &str) -> bool {
        super::is_uuid(id)
    }
}

/// Materialize stored cents as an exact two-decimal amount
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert a client-supplied price into stored cents.
///
/// Returns `None` for negative amounts, more than two fraction digits, or
/// amounts too large for the cents representation.
pub fn decimal_to_cents(price: Decimal) -> Option<i64> {
    if price.is_sign_negative() {
        return None;
    }
    if price.round_dp(2) != price {
        return None;
    }
    (price * Decimal::ONE_HUNDRED).to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_to_cents() {
        assert_eq!(decimal_to_cents(dec!(10)), Some(1000));
        assert_eq!(decimal_to_cents(dec!(10.50)), Some(1050));
        assert_eq!(decimal_to_cents(dec!(0)), Some(0));
        assert_eq!(decimal_to_cents(dec!(0.05)), Some(5));
    }

    #[test]
    fn test_decimal_to_cents_rejects_negative() {
        assert_eq!(decimal_to_cents(dec!(-1)), None);
    }

    #[test]
    fn test_decimal_to_cents_rejects_sub_cent_precision() {
        assert_eq!(decimal_to_cents(dec!(1.001)), None);
    }

    #[test]
    fn test_decimal_to_cents_accepts_trailing_zeros() {
        assert_eq!(decimal_to_cents(dec!(10.0000)), Some(1000));
    }

    #[test]
    fn test_cents_roundtrip() {
        let price = dec!(129.99);
        assert_eq!(cents_to_decimal(decimal_to_cents(price).unwrap()), price);
    }
}
