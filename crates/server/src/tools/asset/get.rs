//! asset_get tool implementation.
//!
//! Retrieves cached asset metadata by digest.

use quizasset_client::cache_path;
use quizasset_core::{AssetDb, AssetMeta, Error, cache::is_valid_digest};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the asset_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetGetParams {
    /// The digest of the cached asset to describe.
    pub digest: String,
}

/// Output from the asset_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetGetOutput {
    pub digest: String,
    /// URL the asset was first fetched from.
    pub url: String,
    pub mime_type: String,
    pub byte_size: u64,
    /// RFC 3339 timestamp of the first successful fetch.
    pub created_at: String,
    /// Local path clients use to load the asset.
    pub path: String,
}

impl AssetGetOutput {
    fn new(meta: AssetMeta, assets_base_path: &str) -> Self {
        Self {
            path: cache_path(assets_base_path, &meta.digest),
            byte_size: meta.byte_size,
            digest: meta.digest,
            url: meta.url,
            mime_type: meta.mime_type,
            created_at: meta.created_at,
        }
    }
}

/// Implementation of the asset_get tool.
pub async fn get_impl(db: &AssetDb, assets_base_path: &str, params: AssetGetParams) -> Result<CallToolResult, McpError> {
    if !is_valid_digest(&params.digest) {
        return Err(Error::InvalidInput(format!("malformed digest {:?}", params.digest)).into());
    }

    let meta = db
        .find_meta_by_digest(&params.digest)
        .await?
        .ok_or_else(|| Error::CacheMiss(params.digest.clone()))?;

    let output = AssetGetOutput::new(meta, assets_base_path);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize asset: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output_json;
    use quizasset_core::{AssetRecord, digest};

    #[tokio::test]
    async fn test_get_impl_invalid_digest() {
        let db = AssetDb::open_in_memory().await.unwrap();
        let params = AssetGetParams { digest: "nonexistent".to_string() };

        let err = get_impl(&db, "/assets", params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);

        let upper = AssetGetParams { digest: digest("example.com/a.png").to_uppercase() };
        let err = get_impl(&db, "/assets", upper).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let db = AssetDb::open_in_memory().await.unwrap();
        let params = AssetGetParams { digest: digest("example.com/none.png") };

        let err = get_impl(&db, "/assets", params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let db = AssetDb::open_in_memory().await.unwrap();
        let record = AssetRecord::new("http://example.com/pic.png", "image/png", vec![0u8; 16]);
        db.insert_asset(&record).await.unwrap();

        let params = AssetGetParams { digest: record.digest.clone() };
        let result = get_impl(&db, "/assets/", params).await.unwrap();
        let json = output_json(&result);

        assert_eq!(json["url"], "http://example.com/pic.png");
        assert_eq!(json["mime_type"], "image/png");
        assert_eq!(json["byte_size"], 16);
        assert_eq!(json["path"], format!("/assets/{}", record.digest));
    }
}
