pub mod gateway;
pub mod store;
pub mod sync;

pub use gateway::{derive_public_id, BlobGateway, CloudinaryGateway, RemoteDelete};
pub use store::{AssetRepository, RedbAssetStore};
pub use sync::{AssetSynchronizer, BulkCreateOutcome, PurgeSummary};
