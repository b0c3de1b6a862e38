pub mod assets;
pub mod health;
pub mod orders;
pub mod products;
pub mod revenue;
pub mod stores;
pub mod validation;

pub use assets::{create_assets, delete_asset, list_assets, purge_assets};
pub use health::health_check;
pub use orders::ingest_order;
pub use products::{create_product, list_products};
pub use revenue::store_revenue;
pub use stores::register_store;
pub use validation::authorize_store;
