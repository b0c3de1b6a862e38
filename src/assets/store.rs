use async_trait::async_trait;
use chrono::Utc;
use redb::ReadableTable;
use uuid::Uuid;

use crate::db::{tables, Db};
use crate::error::Result;
use crate::models::{Asset, AssetRecord};

/// Persistence surface the asset synchronizer drives.
///
/// Every method is store-scoped or id-addressed; `insert` must commit each
/// record independently so one bad URL in a batch cannot roll back its
/// siblings.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn insert(&self, store_id: &str, url: &str) -> Result<Asset>;
    async fn list(&self, store_id: &str) -> Result<Vec<Asset>>;
    async fn find(&self, asset_id: &str) -> Result<Option<Asset>>;
    /// Remove one record; `false` when it was already absent
    async fn remove(&self, asset_id: &str) -> Result<bool>;
    /// Remove the given records in one transaction; returns rows removed
    async fn remove_many(&self, store_id: &str, asset_ids: &[String]) -> Result<u64>;
}

/// redb-backed asset repository
pub struct RedbAssetStore {
    db: Db,
}

impl RedbAssetStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AssetRepository for RedbAssetStore {
    async fn insert(&self, store_id: &str, url: &str) -> Result<Asset> {
        let db = self.db.clone();
        let id = Uuid::new_v4().to_string();
        let record = AssetRecord {
            store_id: store_id.to_string(),
            url: url.to_string(),
            created_at: Utc::now().timestamp(),
        };

        let asset_id = id.clone();
        let stored = record.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let write_txn = db.begin_write()?;
            {
                let mut assets = write_txn.open_table(tables::ASSETS)?;
                let bytes = bincode::serialize(&stored)?;
                assets.insert(asset_id.as_str(), bytes.as_slice())?;

                let mut index = write_txn.open_table(tables::STORE_ASSETS)?;
                let mut ids: Vec<String> = index
                    .get(stored.store_id.as_str())?
                    .map(|b| bincode::deserialize(b.value()))
                    .transpose()?
                    .unwrap_or_default();
                ids.push(asset_id.clone());
                let bytes = bincode::serialize(&ids)?;
                index.insert(stored.store_id.as_str(), bytes.as_slice())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await??;

        Ok(Asset::from_record(id, record))
    }

    async fn list(&self, store_id: &str) -> Result<Vec<Asset>> {
        let db = self.db.clone();
        let store_id = store_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<Vec<Asset>> {
            let read_txn = db.begin_read()?;
            let index = read_txn.open_table(tables::STORE_ASSETS)?;
            let assets = read_txn.open_table(tables::ASSETS)?;

            let ids: Vec<String> = match index.get(store_id.as_str())? {
                Some(bytes) => bincode::deserialize(bytes.value())?,
                None => Vec::new(),
            };

            let mut found = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(bytes) = assets.get(id.as_str())? {
                    let record: AssetRecord = bincode::deserialize(bytes.value())?;
                    found.push(Asset::from_record(id, record));
                }
            }
            Ok(found)
        })
        .await?
    }

    async fn find(&self, asset_id: &str) -> Result<Option<Asset>> {
        let db = self.db.clone();
        let asset_id = asset_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<Option<Asset>> {
            let read_txn = db.begin_read()?;
            let assets = read_txn.open_table(tables::ASSETS)?;

            let record: Option<AssetRecord> = assets
                .get(asset_id.as_str())?
                .map(|b| bincode::deserialize(b.value()))
                .transpose()?;

            Ok(record.map(|r| Asset::from_record(asset_id, r)))
        })
        .await?
    }

    async fn remove(&self, asset_id: &str) -> Result<bool> {
        let db = self.db.clone();
        let asset_id = asset_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<bool> {
            let write_txn = db.begin_write()?;
            let removed;
            {
                let mut assets = write_txn.open_table(tables::ASSETS)?;
                let old: Option<AssetRecord> = assets
                    .remove(asset_id.as_str())?
                    .map(|b| bincode::deserialize(b.value()))
                    .transpose()?;

                removed = old.is_some();

                if let Some(record) = old {
                    let mut index = write_txn.open_table(tables::STORE_ASSETS)?;
                    let ids: Option<Vec<String>> = index
                        .get(record.store_id.as_str())?
                        .map(|b| bincode::deserialize(b.value()))
                        .transpose()?;
                    if let Some(mut ids) = ids {
                        ids.retain(|id| *id != asset_id);
                        let bytes = bincode::serialize(&ids)?;
                        index.insert(record.store_id.as_str(), bytes.as_slice())?;
                    }
                }
            }
            write_txn.commit()?;
            Ok(removed)
        })
        .await?
    }

    async fn remove_many(&self, store_id: &str, asset_ids: &[String]) -> Result<u64> {
        let db = self.db.clone();
        let store_id = store_id.to_string();
        let asset_ids = asset_ids.to_vec();

        tokio::task::spawn_blocking(move || -> Result<u64> {
            let write_txn = db.begin_write()?;
            let mut removed = 0u64;
            {
                let mut assets = write_txn.open_table(tables::ASSETS)?;
                for id in &asset_ids {
                    if assets.remove(id.as_str())?.is_some() {
                        removed += 1;
                    }
                }

                let mut index = write_txn.open_table(tables::STORE_ASSETS)?;
                let ids: Option<Vec<String>> = index
                    .get(store_id.as_str())?
                    .map(|b| bincode::deserialize(b.value()))
                    .transpose()?;
                if let Some(mut ids) = ids {
                    ids.retain(|id| !asset_ids.contains(id));
                    let bytes = bincode::serialize(&ids)?;
                    index.insert(store_id.as_str(), bytes.as_slice())?;
                }
            }
            write_txn.commit()?;
            Ok(removed)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redb::Database;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> RedbAssetStore {
        let db = Database::create(temp_dir.path().join("assets.db")).unwrap();

        let write_txn = db.begin_write().unwrap();
        {
            let _ = write_txn.open_table(tables::ASSETS).unwrap();
            let _ = write_txn.open_table(tables::STORE_ASSETS).unwrap();
        }
        write_txn.commit().unwrap();

        RedbAssetStore::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.insert("s1", "https://host/a.jpg").await.unwrap();
        store.insert("s1", "https://host/b.jpg").await.unwrap();
        store.insert("s2", "https://host/c.jpg").await.unwrap();

        let assets = store.list("s1").await.unwrap();
        assert_eq!(assets.len(), 2);
        assert!(assets.iter().all(|a| a.store_id == "s1"));
    }

    #[tokio::test]
    async fn test_find_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let asset = store.insert("s1", "https://host/a.jpg").await.unwrap();
        assert!(store.find(&asset.id).await.unwrap().is_some());

        assert!(store.remove(&asset.id).await.unwrap());
        assert!(store.find(&asset.id).await.unwrap().is_none());
        assert!(store.list("s1").await.unwrap().is_empty());

        // Removing again reports absence instead of failing
        assert!(!store.remove(&asset.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_many_only_touches_named_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let a = store.insert("s1", "https://host/a.jpg").await.unwrap();
        let b = store.insert("s1", "https://host/b.jpg").await.unwrap();
        let c = store.insert("s1", "https://host/c.jpg").await.unwrap();

        let removed = store
            .remove_many("s1", &[a.id.clone(), c.id.clone()])
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let remaining = store.list("s1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
    }

    #[tokio::test]
    async fn test_list_unknown_store_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        assert!(store.list("nope").await.unwrap().is_empty());
    }
}
