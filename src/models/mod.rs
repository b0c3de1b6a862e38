pub mod asset;
pub mod order;
pub mod product;
pub mod store;

pub use asset::{Asset, AssetRecord};
pub use order::{Order, OrderItem, OrderItemRecord, OrderRecord};
pub use product::{Product, ProductRecord};
pub use store::{Store, StoreRecord};

use uuid::Uuid;

/// Validate that an identifier is a UUID (all record keys are UUID strings)
pub(crate) fn is_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}
