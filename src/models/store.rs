use serde::{Deserialize, Serialize};

/// Store record persisted in redb
/// Uses Unix timestamp for compact storage with bincode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    /// When the store was registered (Unix timestamp)
    pub created_at: i64,
}

/// Store model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

impl Store {
    pub fn from_record(id: String, record: StoreRecord) -> Self {
        Self {
            id,
            name: record.name,
            created_at: record.created_at,
        }
    }

    /// Validate that a store ID is a UUID string
    pub fn validate_id(id: &str) -> bool {
        super::is_uuid(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(Store::validate_id("8c3f2a44-1f09-4f27-9d0a-1a2b3c4d5e6f"));
        assert!(!Store::validate_id("store-1"));
        assert!(!Store::validate_id(""));
        assert!(!Store::validate_id("8c3f2a44-1f09-4f27-9d0a"));
    }
}
