use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_STORE_NAME_BYTES;
use crate::error::{AppError, Result};
use crate::models::Store;
use crate::security::store_access_token;
use crate::stores;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterStoreRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStoreResponse {
    pub store: Store,
    /// Presented on every store-scoped request via the token header.
    /// Derived, not stored; shown only in this response.
    pub access_token: String,
}

/// Register a new store and issue its access token
pub async fn register_store(
    State(state): State<AppState>,
    Json(payload): Json<RegisterStoreRequest>,
) -> Result<Json<RegisterStoreResponse>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Store name is required".to_string()));
    }
    if name.len() > MAX_STORE_NAME_BYTES {
        return Err(AppError::InvalidInput("Store name is too long".to_string()));
    }

    let store = stores::create_store(state.db.clone(), name).await?;
    let access_token = store_access_token(&store.id, &state.config.app_secret_key);

    Ok(Json(RegisterStoreResponse {
        store,
        access_token,
    }))
}
