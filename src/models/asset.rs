use serde::{Deserialize, Serialize};

use crate::constants::MAX_ASSET_URL_BYTES;

/// Asset record persisted in redb
///
/// Metadata mirror of an image whose bytes live at the hosting provider.
/// Never mutated; removed only after the remote copy is confirmed gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub store_id: String,
    pub url: String,
    /// When the record was created (Unix timestamp)
    pub created_at: i64,
}

/// Asset model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub store_id: String,
    pub url: String,
    pub created_at: i64,
}

impl Asset {
    pub fn from_record(id: String, record: AssetRecord) -> Self {
        Self {
            id,
            store_id: record.store_id,
            url: record.url,
            created_at: record.created_at,
        }
    }

    /// Validate that an asset ID is a UUID string
    pub fn validate_id(id: &str) -> bool {
        super::is_uuid(id)
    }

    /// Cheap shape check for candidate URLs before any record is created
    pub fn validate_url(url: &str) -> bool {
        !url.is_empty()
            && url.len() <= MAX_ASSET_URL_BYTES
            && (url.starts_with("http://") || url.starts_with("https://"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(Asset::validate_url(
            "https://res.cloudinary.com/demo/image/upload/v1/sample.jpg"
        ));
        assert!(Asset::validate_url("http://host/img.png"));
        assert!(!Asset::validate_url(""));
        assert!(!Asset::validate_url("ftp://host/img.png"));
        assert!(!Asset::validate_url("res.cloudinary.com/sample.jpg"));
    }

    #[test]
    fn test_validate_url_rejects_oversized() {
        let url = format!("https://host/{}.jpg", "a".repeat(MAX_ASSET_URL_BYTES));
        assert!(!Asset::validate_url(&url));
    }
}
