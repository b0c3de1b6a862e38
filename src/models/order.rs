use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::cents_to_decimal;

/// One line item on a stored order.
///
/// The unit price is captured at ingest time; whether reports use it or the
/// product's current price is decided by the configured price mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub product_id: String,
    pub unit_price_cents: i64,
}

/// Order record persisted in redb
///
/// Immutable once flagged paid; the revenue ledger treats paid orders as a
/// closed ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub store_id: String,
    pub is_paid: bool,
    /// When the order was placed (Unix timestamp, UTC)
    pub created_at: i64,
    pub items: Vec<OrderItemRecord>,
}

/// Order line item for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub unit_price: Decimal,
}

/// Order model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub store_id: String,
    pub is_paid: bool,
    pub created_at: i64,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn from_record(id: String, record: OrderRecord) -> Self {
        Self {
            id,
            store_id: record.store_id,
            is_paid: record.is_paid,
            created_at: record.created_at,
            items: record
                .items
                .into_iter()
                .map(|item| OrderItem {
                    product_id: item.product_id,
                    unit_price: cents_to_decimal(item.unit_price_cents),
                })
                .collect(),
        }
    }
}
