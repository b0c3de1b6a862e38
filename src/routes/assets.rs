use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::assets::{AssetSynchronizer, BulkCreateOutcome, PurgeSummary, RedbAssetStore};
use crate::constants::{ERR_INVALID_ASSET_ID, MAX_ASSET_BATCH};
use crate::error::{AppError, Result};
use crate::models::Asset;
use crate::routes::validation::authorize_store;
use crate::stores;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAssetsRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteAssetResponse {
    pub success: bool,
}

/// Wire the synchronizer from request state: the redb-backed record store
/// plus the shared remote gateway
fn synchronizer(state: &AppState) -> AssetSynchronizer {
    AssetSynchronizer::new(
        Arc::new(RedbAssetStore::new(state.db.clone())),
        state.gateway.clone(),
        state.config.remote_delete_concurrency,
    )
}

/// Create asset records for a batch of already-uploaded image URLs
///
/// Always answers a structured per-item result; one bad URL never blocks
/// its siblings.
pub async fn create_assets(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateAssetsRequest>,
) -> Result<Json<BulkCreateOutcome>> {
    authorize_store(&headers, &store_id, &state.config)?;
    stores::require_store(&state.db, &store_id).await?;

    if payload.urls.len() > MAX_ASSET_BATCH {
        return Err(AppError::InvalidInput(format!(
            "At most {} URLs per request",
            MAX_ASSET_BATCH
        )));
    }

    let outcome = synchronizer(&state)
        .bulk_create(&store_id, &payload.urls)
        .await;

    Ok(Json(outcome))
}

/// List the store's asset records
pub async fn list_assets(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Asset>>> {
    authorize_store(&headers, &store_id, &state.config)?;
    stores::require_store(&state.db, &store_id).await?;

    use crate::assets::AssetRepository;
    let assets = RedbAssetStore::new(state.db.clone()).list(&store_id).await?;

    Ok(Json(assets))
}

/// Delete one asset: remote blob first, local record only after the host
/// confirms. 404 when absent, 409 when the host did not confirm.
pub async fn delete_asset(
    State(state): State<AppState>,
    Path((store_id, asset_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<DeleteAssetResponse>> {
    authorize_store(&headers, &store_id, &state.config)?;

    if !Asset::validate_id(&asset_id) {
        return Err(AppError::InvalidInput(ERR_INVALID_ASSET_ID.to_string()));
    }

    synchronizer(&state).delete_one(&store_id, &asset_id).await?;

    Ok(Json(DeleteAssetResponse { success: true }))
}

/// Delete every asset of the store; partial completion is reported, not
/// failed
pub async fn purge_assets(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PurgeSummary>> {
    authorize_store(&headers, &store_id, &state.config)?;
    stores::require_store(&state.db, &store_id).await?;

    let summary = synchronizer(&state).purge_store(&store_id).await?;

    Ok(Json(summary))
}
