use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, Result};

const DESTROY_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one remote delete attempt.
///
/// `AlreadyAbsent` counts as success for the consistency contract: the blob
/// is gone either way, so the local record may be removed. `Failed` keeps
/// the local record; the caller may retry later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteDelete {
    Deleted,
    AlreadyAbsent,
    Failed(String),
}

impl RemoteDelete {
    /// True when the remote copy is confirmed gone
    pub fn confirmed_gone(&self) -> bool {
        matches!(self, RemoteDelete::Deleted | RemoteDelete::AlreadyAbsent)
    }
}

/// Point-delete capability of the image host.
///
/// The host is never listed or queried, only asked to destroy a single blob;
/// no retry or backoff happens at this layer.
#[async_trait]
pub trait BlobGateway: Send + Sync {
    async fn delete_blob(&self, public_id: &str) -> RemoteDelete;
}

/// Derive the hosting provider's public id from a stored asset URL: the last
/// path segment with query, fragment, and file extension stripped.
///
/// Fails locally, without contacting the remote, when the URL has no such
/// segment.
pub fn derive_public_id(url: &str) -> Result<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or(AppError::MalformedAssetUrl)?;

    // Host only, no path to address a blob with
    let (_, path) = rest.split_once('/').ok_or(AppError::MalformedAssetUrl)?;

    let path = path.split(['?', '#']).next().unwrap_or("");
    let segment = path.rsplit('/').next().unwrap_or("");

    let stem = segment.split('.').next().unwrap_or("");
    if stem.is_empty() {
        return Err(AppError::MalformedAssetUrl);
    }

    Ok(stem.to_string())
}

/// Response body of the Cloudinary destroy endpoint
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
}

/// Gateway against the Cloudinary image API
pub struct CloudinaryGateway {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryGateway {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        let client = Client::builder()
            .timeout(DESTROY_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            cloud_name,
            api_key,
            api_secret,
        }
    }

    fn destroy_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/destroy",
            self.cloud_name
        )
    }
}

/// Map an HTTP destroy response onto the delete outcome.
///
/// Cloudinary answers 200 with `result: "ok"` or `result: "not found"`;
/// everything else is treated as a transient failure.
fn classify_destroy_response(status: StatusCode, body: Option<&DestroyResponse>) -> RemoteDelete {
    if !status.is_success() {
        return RemoteDelete::Failed(format!("image host returned HTTP {}", status));
    }

    match body.and_then(|b| b.result.as_deref()) {
        Some("ok") => RemoteDelete::Deleted,
        Some("not found") => RemoteDelete::AlreadyAbsent,
        Some(other) => RemoteDelete::Failed(format!("unexpected destroy result: {}", other)),
        None => RemoteDelete::Failed("destroy response missing result".to_string()),
    }
}

#[async_trait]
impl BlobGateway for CloudinaryGateway {
    async fn delete_blob(&self, public_id: &str) -> RemoteDelete {
        let response = self
            .client
            .post(self.destroy_url())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&serde_json::json!({ "public_id": public_id }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return RemoteDelete::Failed(format!("destroy request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return classify_destroy_response(status, None);
        }

        match response.json::<DestroyResponse>().await {
            Ok(body) => classify_destroy_response(status, Some(&body)),
            Err(e) => RemoteDelete::Failed(format!("destroy response unreadable: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_public_id_strips_extension() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1710000000/abc123.jpg";
        assert_eq!(derive_public_id(url).unwrap(), "abc123");
    }

    #[test]
    fn test_derive_public_id_without_extension() {
        let url = "https://res.cloudinary.com/demo/image/upload/abc123";
        assert_eq!(derive_public_id(url).unwrap(), "abc123");
    }

    #[test]
    fn test_derive_public_id_ignores_query_and_fragment() {
        let url = "https://host/images/abc123.png?w=300#frag";
        assert_eq!(derive_public_id(url).unwrap(), "abc123");
    }

    #[test]
    fn test_derive_public_id_rejects_trailing_slash() {
        assert!(derive_public_id("https://host/images/").is_err());
    }

    #[test]
    fn test_derive_public_id_rejects_bare_host() {
        assert!(derive_public_id("https://host").is_err());
    }

    #[test]
    fn test_derive_public_id_rejects_non_http() {
        assert!(derive_public_id("ftp://host/images/a.jpg").is_err());
        assert!(derive_public_id("not a url").is_err());
    }

    #[test]
    fn test_derive_public_id_rejects_extension_only_segment() {
        assert!(derive_public_id("https://host/images/.jpg").is_err());
    }

    #[test]
    fn test_classify_ok() {
        let body = DestroyResponse {
            result: Some("ok".to_string()),
        };
        assert_eq!(
            classify_destroy_response(StatusCode::OK, Some(&body)),
            RemoteDelete::Deleted
        );
    }

    #[test]
    fn test_classify_not_found_is_already_absent() {
        let body = DestroyResponse {
            result: Some("not found".to_string()),
        };
        assert_eq!(
            classify_destroy_response(StatusCode::OK, Some(&body)),
            RemoteDelete::AlreadyAbsent
        );
    }

    #[test]
    fn test_classify_server_error_is_failure() {
        let outcome = classify_destroy_response(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert!(matches!(outcome, RemoteDelete::Failed(_)));
    }

    #[test]
    fn test_classify_unexpected_result_is_failure() {
        let body = DestroyResponse {
            result: Some("pending".to_string()),
        };
        let outcome = classify_destroy_response(StatusCode::OK, Some(&body));
        assert!(matches!(outcome, RemoteDelete::Failed(_)));
    }

    #[test]
    fn test_confirmed_gone() {
        assert!(RemoteDelete::Deleted.confirmed_gone());
        assert!(RemoteDelete::AlreadyAbsent.confirmed_gone());
        assert!(!RemoteDelete::Failed("x".to_string()).confirmed_gone());
    }
}
