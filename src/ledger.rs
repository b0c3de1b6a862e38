use redb::ReadableTable;
use rust_decimal::Decimal;

use crate::config::PriceMode;
use crate::db::{tables, Db};
use crate::error::{AppError, Result};
use crate::models::product::cents_to_decimal;
use crate::models::{OrderRecord, ProductRecord};

/// A paid order as the revenue aggregator consumes it: a creation timestamp
/// and one resolved price per line item.
#[derive(Debug, Clone)]
pub struct PaidOrder {
    /// Unix timestamp, UTC
    pub created_at: i64,
    pub item_prices: Vec<Decimal>,
}

/// Read-only view over the paid orders of one store.
///
/// Price resolution depends on the configured mode: `Live` follows the
/// product's current price (editing a product retroactively moves historical
/// revenue), `Snapshot` uses the unit price captured at ingest.
pub struct OrderLedger {
    db: Db,
    price_mode: PriceMode,
}

impl OrderLedger {
    pub fn new(db: Db, price_mode: PriceMode) -> Self {
        Self { db, price_mode }
    }

    /// All orders flagged paid for the store, items priced per the mode.
    ///
    /// Unpaid orders are filtered here so the aggregator never sees them.
    pub async fn paid_orders(&self, store_id: &str) -> Result<Vec<PaidOrder>> {
        let db = self.db.clone();
        let price_mode = self.price_mode;
        let store_id = store_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<Vec<PaidOrder>> {
            let read_txn = db.begin_read()?;
            let index = read_txn.open_table(tables::STORE_ORDERS)?;
            let orders = read_txn.open_table(tables::ORDERS)?;
            let products = read_txn.open_table(tables::PRODUCTS)?;

            let order_ids: Vec<String> = match index.get(store_id.as_str())? {
                Some(bytes) => bincode::deserialize(bytes.value())?,
                None => Vec::new(),
            };

            let mut paid = Vec::new();
            for order_id in &order_ids {
                let record: OrderRecord = match orders.get(order_id.as_str())? {
                    Some(bytes) => bincode::deserialize(bytes.value())?,
                    None => {
                        tracing::warn!("Order index entry without record: {}", order_id);
                        continue;
                    }
                };

                if !record.is_paid {
                    continue;
                }

                let mut item_prices = Vec::with_capacity(record.items.len());
                for item in &record.items {
                    let cents = match price_mode {
                        PriceMode::Snapshot => item.unit_price_cents,
                        PriceMode::Live => {
                            let product: ProductRecord =
                                match products.get(item.product_id.as_str())? {
                                    Some(bytes) => bincode::deserialize(bytes.value())?,
                                    None => {
                                        return Err(AppError::MissingProduct(
                                            item.product_id.clone(),
                                        ))
                                    }
                                };
                            product.price_cents
                        }
                    };
                    item_prices.push(cents_to_decimal(cents));
                }

                paid.push(PaidOrder {
                    created_at: record.created_at,
                    item_prices,
                });
            }

            Ok(paid)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderItemRecord;
    use redb::Database;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_db(temp_dir: &TempDir) -> Db {
        let db = Database::create(temp_dir.path().join("ledger.db")).unwrap();

        let write_txn = db.begin_write().unwrap();
        {
            let _ = write_txn.open_table(tables::PRODUCTS).unwrap();
            let _ = write_txn.open_table(tables::ORDERS).unwrap();
            let _ = write_txn.open_table(tables::STORE_ORDERS).unwrap();
        }
        write_txn.commit().unwrap();

        Arc::new(db)
    }

    fn insert_product(db: &Db, product_id: &str, store_id: &str, price_cents: i64) {
        let record = ProductRecord {
            store_id: store_id.to_string(),
            name: "product".to_string(),
            price_cents,
            created_at: 0,
        };
        let write_txn = db.begin_write().unwrap();
        {
            let mut products = write_txn.open_table(tables::PRODUCTS).unwrap();
            let bytes = bincode::serialize(&record).unwrap();
            products.insert(product_id, bytes.as_slice()).unwrap();
        }
        write_txn.commit().unwrap();
    }

    fn insert_order(
        db: &Db,
        order_id: &str,
        store_id: &str,
        is_paid: bool,
        created_at: i64,
        items: Vec<OrderItemRecord>,
    ) {
        let record = OrderRecord {
            store_id: store_id.to_string(),
            is_paid,
            created_at,
            items,
        };
        let write_txn = db.begin_write().unwrap();
        {
            let mut orders = write_txn.open_table(tables::ORDERS).unwrap();
            let bytes = bincode::serialize(&record).unwrap();
            orders.insert(order_id, bytes.as_slice()).unwrap();

            let mut index = write_txn.open_table(tables::STORE_ORDERS).unwrap();
            let mut ids: Vec<String> = index
                .get(store_id)
                .unwrap()
                .map(|b| bincode::deserialize(b.value()).unwrap())
                .unwrap_or_default();
            ids.push(order_id.to_string());
            let bytes = bincode::serialize(&ids).unwrap();
            index.insert(store_id, bytes.as_slice()).unwrap();
        }
        write_txn.commit().unwrap();
    }

    fn item(product_id: &str, unit_price_cents: i64) -> OrderItemRecord {
        OrderItemRecord {
            product_id: product_id.to_string(),
            unit_price_cents,
        }
    }

    #[tokio::test]
    async fn test_paid_orders_excludes_unpaid() {
        let temp_dir = TempDir::new().unwrap();
        let db = test_db(&temp_dir);
        insert_product(&db, "p1", "s1", 1000);
        insert_order(&db, "o1", "s1", true, 100, vec![item("p1", 1000)]);
        insert_order(&db, "o2", "s1", false, 100, vec![item("p1", 1000)]);

        let ledger = OrderLedger::new(db, PriceMode::Live);
        let orders = ledger.paid_orders("s1").await.unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_yields_no_orders() {
        let temp_dir = TempDir::new().unwrap();
        let db = test_db(&temp_dir);

        let ledger = OrderLedger::new(db, PriceMode::Live);
        let orders = ledger.paid_orders("missing").await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_live_mode_follows_current_price() {
        let temp_dir = TempDir::new().unwrap();
        let db = test_db(&temp_dir);
        // Ordered at 10.00, product later repriced to 25.00
        insert_order(&db, "o1", "s1", true, 100, vec![item("p1", 1000)]);
        insert_product(&db, "p1", "s1", 2500);

        let ledger = OrderLedger::new(db, PriceMode::Live);
        let orders = ledger.paid_orders("s1").await.unwrap();
        assert_eq!(orders[0].item_prices, vec![dec!(25.00)]);
    }

    #[tokio::test]
    async fn test_snapshot_mode_keeps_ingest_price() {
        let temp_dir = TempDir::new().unwrap();
        let db = test_db(&temp_dir);
        insert_order(&db, "o1", "s1", true, 100, vec![item("p1", 1000)]);
        insert_product(&db, "p1", "s1", 2500);

        let ledger = OrderLedger::new(db, PriceMode::Snapshot);
        let orders = ledger.paid_orders("s1").await.unwrap();
        assert_eq!(orders[0].item_prices, vec![dec!(10.00)]);
    }

    #[tokio::test]
    async fn test_live_mode_fails_on_missing_product() {
        let temp_dir = TempDir::new().unwrap();
        let db = test_db(&temp_dir);
        insert_order(&db, "o1", "s1", true, 100, vec![item("ghost", 1000)]);

        let ledger = OrderLedger::new(db, PriceMode::Live);
        let result = ledger.paid_orders("s1").await;
        assert!(matches!(result, Err(AppError::MissingProduct(_))));
    }

    #[tokio::test]
    async fn test_snapshot_mode_tolerates_missing_product() {
        let temp_dir = TempDir::new().unwrap();
        let db = test_db(&temp_dir);
        insert_order(&db, "o1", "s1", true, 100, vec![item("ghost", 700)]);

        let ledger = OrderLedger::new(db, PriceMode::Snapshot);
        let orders = ledger.paid_orders("s1").await.unwrap();
        assert_eq!(orders[0].item_prices, vec![dec!(7.00)]);
    }
}
