use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

use crate::assets::gateway::{derive_public_id, BlobGateway, RemoteDelete};
use crate::assets::store::AssetRepository;
use crate::error::{AppError, Result};
use crate::models::Asset;

/// A URL that could not be turned into an asset record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedCreate {
    pub url: String,
    pub error: String,
}

/// Structured result of a bulk create: per-item outcomes, never an
/// all-or-nothing failure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateOutcome {
    pub created: Vec<Asset>,
    pub failed: Vec<FailedCreate>,
}

/// An asset retained by a purge because its remote delete did not confirm
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeError {
    pub asset_id: String,
    pub error: String,
}

/// Result of a delete-all sweep. Partial completion is expected and
/// reportable; retained rows can be re-driven by a later call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeSummary {
    pub deleted_count: u64,
    pub retained_count: u64,
    pub errors: Vec<PurgeError>,
}

/// Keeps asset records and remotely hosted blobs consistent.
///
/// Deletes always run remote-then-local: a local row may only disappear
/// after the host confirmed the blob gone, so an interrupted or failed run
/// leaves rows behind rather than unreferenced remote blobs.
pub struct AssetSynchronizer {
    repository: Arc<dyn AssetRepository>,
    gateway: Arc<dyn BlobGateway>,
    /// Cap on simultaneous in-flight remote deletes
    concurrency: usize,
}

impl AssetSynchronizer {
    pub fn new(
        repository: Arc<dyn AssetRepository>,
        gateway: Arc<dyn BlobGateway>,
        concurrency: usize,
    ) -> Self {
        Self {
            repository,
            gateway,
            concurrency: concurrency.max(1),
        }
    }

    /// Create one asset record per candidate URL.
    ///
    /// Items are independent: each URL is validated and inserted on its own,
    /// and a failure is reported in the outcome instead of aborting the
    /// batch. Uploads already happened on the client; only the record
    /// mirror is created here.
    pub async fn bulk_create(&self, store_id: &str, urls: &[String]) -> BulkCreateOutcome {
        let mut created = Vec::new();
        let mut failed = Vec::new();

        for raw_url in urls {
            let url = raw_url.trim();

            if !Asset::validate_url(url) {
                failed.push(FailedCreate {
                    url: raw_url.clone(),
                    error: AppError::InvalidInput("URL must be http(s)".to_string()).to_string(),
                });
                continue;
            }
            // The record must be deletable later, so an underivable URL is
            // rejected up front rather than stored as a dead mirror
            if let Err(e) = derive_public_id(url) {
                failed.push(FailedCreate {
                    url: raw_url.clone(),
                    error: e.to_string(),
                });
                continue;
            }

            match self.repository.insert(store_id, url).await {
                Ok(asset) => created.push(asset),
                Err(e) => {
                    tracing::warn!("Asset create failed for {}: {}", url, e);
                    failed.push(FailedCreate {
                        url: raw_url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Bulk asset create for store {}: {} created, {} failed",
            store_id,
            created.len(),
            failed.len()
        );

        BulkCreateOutcome { created, failed }
    }

    /// Delete one asset, remote first.
    ///
    /// The local row is removed only once the host reports the blob deleted
    /// or already absent; a failed remote delete keeps the row and surfaces
    /// as a retryable conflict.
    pub async fn delete_one(&self, store_id: &str, asset_id: &str) -> Result<()> {
        let asset = self
            .repository
            .find(asset_id)
            .await?
            .ok_or(AppError::AssetNotFound)?;

        // Foreign assets read as absent; existence is not leaked across stores
        if asset.store_id != store_id {
            tracing::warn!("Asset {} requested by store {}", asset_id, store_id);
            return Err(AppError::AssetNotFound);
        }

        let public_id = derive_public_id(&asset.url)?;

        match self.gateway.delete_blob(&public_id).await {
            RemoteDelete::Deleted | RemoteDelete::AlreadyAbsent => {
                self.repository.remove(asset_id).await?;
                tracing::info!("Asset {} deleted for store {}", asset_id, store_id);
                Ok(())
            }
            RemoteDelete::Failed(reason) => Err(AppError::RemoteDeleteFailed(reason)),
        }
    }

    /// Delete every asset of a store, remote deletes fanned out with bounded
    /// concurrency and no short-circuiting.
    ///
    /// Only rows whose remote outcome confirmed the blob gone are removed;
    /// the rest are retained and reported, eligible for a later retry.
    pub async fn purge_store(&self, store_id: &str) -> Result<PurgeSummary> {
        let assets = self.repository.list(store_id).await?;

        // Outcomes travel with their asset, so completion order cannot
        // scramble the id association
        let outcomes: Vec<(Asset, RemoteDelete)> = stream::iter(assets)
            .map(|asset| {
                let gateway = self.gateway.clone();
                async move {
                    let outcome = match derive_public_id(&asset.url) {
                        Ok(public_id) => gateway.delete_blob(&public_id).await,
                        Err(e) => RemoteDelete::Failed(e.to_string()),
                    };
                    (asset, outcome)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut confirmed_ids = Vec::new();
        let mut errors = Vec::new();
        for (asset, outcome) in outcomes {
            match outcome {
                RemoteDelete::Deleted | RemoteDelete::AlreadyAbsent => confirmed_ids.push(asset.id),
                RemoteDelete::Failed(reason) => errors.push(PurgeError {
                    asset_id: asset.id,
                    error: reason,
                }),
            }
        }

        let deleted_count = if confirmed_ids.is_empty() {
            0
        } else {
            self.repository.remove_many(store_id, &confirmed_ids).await?
        };

        tracing::info!(
            "Asset purge for store {}: {} deleted, {} retained",
            store_id,
            deleted_count,
            errors.len()
        );

        Ok(PurgeSummary {
            deleted_count,
            retained_count: errors.len() as u64,
            errors,
        })
    }
}
