use axum::http::HeaderMap;

use crate::config::Config;
use crate::constants::{ERR_INVALID_STORE_ID, STORE_TOKEN_HEADER};
use crate::error::{AppError, Result};
use crate::models::Store;
use crate::security::verify_store_token;

/// Gate for every store-scoped route: the id must be well-formed and the
/// request must carry the access token derived for exactly that store.
///
/// Shape failures answer 400; a missing or foreign token answers 403 before
/// any core code runs.
pub fn authorize_store(headers: &HeaderMap, store_id: &str, config: &Config) -> Result<()> {
    if !Store::validate_id(store_id) {
        return Err(AppError::InvalidInput(ERR_INVALID_STORE_ID.to_string()));
    }

    let token = headers
        .get(STORE_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if !verify_store_token(store_id, token, &config.app_secret_key) {
        tracing::warn!("Rejected access token for store {}", store_id);
        return Err(AppError::Unauthorized);
    }

    Ok(())
}
