use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use redb::ReadableTable;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::MAX_PRODUCT_NAME_BYTES;
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::product::decimal_to_cents;
use crate::models::{Product, ProductRecord};
use crate::routes::validation::authorize_store;
use crate::stores;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Decimal,
}

/// Create a catalog product
pub async fn create_product(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<Product>> {
    authorize_store(&headers, &store_id, &state.config)?;
    stores::require_store(&state.db, &store_id).await?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "Product name is required".to_string(),
        ));
    }
    if name.len() > MAX_PRODUCT_NAME_BYTES {
        return Err(AppError::InvalidInput(
            "Product name is too long".to_string(),
        ));
    }

    let price_cents = decimal_to_cents(payload.price).ok_or_else(|| {
        AppError::InvalidInput(
            "Price must be non-negative with at most two decimal places".to_string(),
        )
    })?;

    let id = Uuid::new_v4().to_string();
    let record = ProductRecord {
        store_id: store_id.clone(),
        name,
        price_cents,
        created_at: Utc::now().timestamp(),
    };

    let db = state.db.clone();
    let product_id = id.clone();
    let stored = record.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut products = write_txn.open_table(tables::PRODUCTS)?;
            let bytes = bincode::serialize(&stored)?;
            products.insert(product_id.as_str(), bytes.as_slice())?;

            let mut index = write_txn.open_table(tables::STORE_PRODUCTS)?;
            let mut ids: Vec<String> = index
                .get(stored.store_id.as_str())?
                .map(|b| bincode::deserialize(b.value()))
                .transpose()?
                .unwrap_or_default();
            ids.push(product_id.clone());
            let bytes = bincode::serialize(&ids)?;
            index.insert(stored.store_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Product {} created for store {}", id, store_id);

    Ok(Json(Product::from_record(id, record)))
}

/// List the store's products
pub async fn list_products(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Product>>> {
    authorize_store(&headers, &store_id, &state.config)?;
    stores::require_store(&state.db, &store_id).await?;

    let db = state.db.clone();
    let products = tokio::task::spawn_blocking(move || -> Result<Vec<Product>> {
        let read_txn = db.begin_read()?;
        let index = read_txn.open_table(tables::STORE_PRODUCTS)?;
        let products = read_txn.open_table(tables::PRODUCTS)?;

        let ids: Vec<String> = match index.get(store_id.as_str())? {
            Some(bytes) => bincode::deserialize(bytes.value())?,
            None => Vec::new(),
        };

        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = products.get(id.as_str())? {
                let record: ProductRecord = bincode::deserialize(bytes.value())?;
                found.push(Product::from_record(id, record));
            }
        }
        Ok(found)
    })
    .await??;

    Ok(Json(products))
}
