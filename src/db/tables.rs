use redb::TableDefinition;

/// Stores table: store_id (UUID) -> StoreRecord (serialized)
pub const STORES: TableDefinition<&str, &[u8]> = TableDefinition::new("stores");

/// Products table: product_id (UUID) -> ProductRecord (serialized)
pub const PRODUCTS: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Store products index: store_id -> Vec<product_id>
pub const STORE_PRODUCTS: TableDefinition<&str, &[u8]> = TableDefinition::new("store_products");

/// Orders table: order_id (UUID) -> OrderRecord (serialized)
pub const ORDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Store orders index: store_id -> Vec<order_id>
/// Used by the revenue ledger to scan one store without a full table walk
pub const STORE_ORDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("store_orders");

/// Assets table: asset_id (UUID) -> AssetRecord (serialized)
pub const ASSETS: TableDefinition<&str, &[u8]> = TableDefinition::new("assets");

/// Store assets index: store_id -> Vec<asset_id>
/// Used for listing and for the delete-all sweep
pub const STORE_ASSETS: TableDefinition<&str, &[u8]> = TableDefinition::new("store_assets");
