pub mod tables;

use redb::Database;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Open or create the redb database at the given path
///
/// Creates all required tables on first run.
pub fn open_database(path: impl AsRef<Path>) -> Result<Db> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::create(path)?;

    // Initialize tables on first run
    let write_txn = db.begin_write()?;
    {
        // Create tables if they don't exist by opening them
        let _ = write_txn.open_table(tables::STORES)?;
        let _ = write_txn.open_table(tables::PRODUCTS)?;
        let _ = write_txn.open_table(tables::STORE_PRODUCTS)?;
        let _ = write_txn.open_table(tables::ORDERS)?;
        let _ = write_txn.open_table(tables::STORE_ORDERS)?;
        let _ = write_txn.open_table(tables::ASSETS)?;
        let _ = write_txn.open_table(tables::STORE_ASSETS)?;
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}
