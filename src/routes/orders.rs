use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::MAX_ORDER_ITEMS;
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{Order, OrderItemRecord, OrderRecord, Product, ProductRecord};
use crate::routes::validation::authorize_store;
use crate::stores;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOrderItem {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOrderRequest {
    pub items: Vec<IngestOrderItem>,
    #[serde(default)]
    pub is_paid: bool,
    /// Optional placement time (Unix seconds, UTC) for back-office imports;
    /// defaults to now
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Ingest an order placed against the storefront.
///
/// Each line item snapshots the product's unit price at ingest time, so
/// reports can answer in either price mode later. An order may carry zero
/// items; it then contributes nothing to revenue.
pub async fn ingest_order(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<IngestOrderRequest>,
) -> Result<Json<Order>> {
    authorize_store(&headers, &store_id, &state.config)?;
    stores::require_store(&state.db, &store_id).await?;

    if payload.items.len() > MAX_ORDER_ITEMS {
        return Err(AppError::InvalidInput("Too many order items".to_string()));
    }

    for item in &payload.items {
        if !Product::validate_id(&item.product_id) {
            return Err(AppError::InvalidInput(format!(
                "Invalid product ID format: {}",
                item.product_id
            )));
        }
    }

    let created_at = match payload.created_at {
        Some(ts) => {
            if DateTime::<Utc>::from_timestamp(ts, 0).is_none() {
                return Err(AppError::InvalidInput(
                    "createdAt is out of range".to_string(),
                ));
            }
            ts
        }
        None => Utc::now().timestamp(),
    };

    let id = Uuid::new_v4().to_string();
    let db = state.db.clone();
    let order_id = id.clone();
    let order_store_id = store_id.clone();
    let is_paid = payload.is_paid;
    let item_ids: Vec<String> = payload.items.into_iter().map(|i| i.product_id).collect();

    let record = tokio::task::spawn_blocking(move || -> Result<OrderRecord> {
        let write_txn = db.begin_write()?;
        let record;
        {
            let products = write_txn.open_table(tables::PRODUCTS)?;

            let mut items = Vec::with_capacity(item_ids.len());
            for product_id in item_ids {
                let product: ProductRecord = match products.get(product_id.as_str())? {
                    Some(bytes) => bincode::deserialize(bytes.value())?,
                    None => {
                        return Err(AppError::InvalidInput(format!(
                            "Unknown product: {}",
                            product_id
                        )))
                    }
                };
                if product.store_id != order_store_id {
                    return Err(AppError::InvalidInput(format!(
                        "Unknown product: {}",
                        product_id
                    )));
                }
                items.push(OrderItemRecord {
                    product_id,
                    unit_price_cents: product.price_cents,
                });
            }
            drop(products);

            record = OrderRecord {
                store_id: order_store_id.clone(),
                is_paid,
                created_at,
                items,
            };

            let mut orders = write_txn.open_table(tables::ORDERS)?;
            let bytes = bincode::serialize(&record)?;
            orders.insert(order_id.as_str(), bytes.as_slice())?;
            drop(orders);

            let mut index = write_txn.open_table(tables::STORE_ORDERS)?;
            let mut ids: Vec<String> = index
                .get(order_store_id.as_str())?
                .map(|b| bincode::deserialize(b.value()))
                .transpose()?
                .unwrap_or_default();
            ids.push(order_id.clone());
            let bytes = bincode::serialize(&ids)?;
            index.insert(order_store_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(record)
    })
    .await??;

    tracing::info!(
        "Order {} ingested for store {} ({} items, paid: {})",
        id,
        store_id,
        record.items.len(),
        record.is_paid
    );

    Ok(Json(Order::from_record(id, record)))
}
