use chrono::Utc;
use uuid::Uuid;

use crate::db::{tables, Db};
use crate::error::{AppError, Result};
use crate::models::{Store, StoreRecord};

/// Register a new store and return its model.
///
/// The caller pairs the returned id with a derived access token; nothing
/// secret is persisted here.
pub async fn create_store(db: Db, name: String) -> Result<Store> {
    let id = Uuid::new_v4().to_string();
    let record = StoreRecord {
        name,
        created_at: Utc::now().timestamp(),
    };

    let stored = record.clone();
    let store_id = id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut stores = write_txn.open_table(tables::STORES)?;
            let bytes = bincode::serialize(&stored)?;
            stores.insert(store_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("New store registered: {}", id);

    Ok(Store::from_record(id, record))
}

/// Fail with `StoreNotFound` unless the store is registered
pub async fn require_store(db: &Db, store_id: &str) -> Result<()> {
    let db = db.clone();
    let id = store_id.to_string();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let read_txn = db.begin_read()?;
        let stores = read_txn.open_table(tables::STORES)?;
        if stores.get(id.as_str())?.is_none() {
            return Err(AppError::StoreNotFound);
        }
        Ok(())
    })
    .await?
}
