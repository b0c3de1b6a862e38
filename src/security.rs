use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Derive the access token for a store.
///
/// `token = hex(HMAC-SHA256(store_id, secret))`. The token is handed out once
/// at store registration; callers present it on every store-scoped request.
/// Deriving rather than storing tokens keeps the database free of secrets.
pub fn store_access_token(store_id: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(store_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a presented token against the store it claims to scope.
pub fn verify_store_token(store_id: &str, token: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(store_id.as_bytes());

    let token_bytes = match hex::decode(token) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Store token is not valid hex");
            return false;
        }
    };

    mac.verify_slice(&token_bytes).is_ok()
}
