//! asset_purge tool implementation.
//!
//! Deletes cached assets by digest or source domain.

use quizasset_core::{AssetDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the asset_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AssetPurgeParams {
    /// Delete the asset with this digest.
    pub digest: Option<String>,

    /// Delete assets whose source URL contains this domain.
    pub domain: Option<String>,
}

/// Output from the asset_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetPurgeOutput {
    /// Number of assets deleted.
    pub deleted: u64,
}

/// Implementation of the asset_purge tool.
pub async fn purge_impl(db: &AssetDb, params: AssetPurgeParams) -> Result<CallToolResult, McpError> {
    if params.digest.is_none() && params.domain.is_none() {
        return Err(Error::InvalidInput("At least one of digest or domain must be specified".to_string()).into());
    }

    if params.domain.as_deref().is_some_and(|d| d.trim().is_empty()) {
        return Err(Error::InvalidInput("domain must not be empty".to_string()).into());
    }

    let mut deleted_total = 0u64;

    if let Some(digest) = params.digest
        && db.delete_asset(&digest).await?
    {
        deleted_total += 1;
    }

    if let Some(domain) = params.domain {
        deleted_total += db.purge_assets_by_domain(domain.trim()).await?;
    }

    tracing::info!(deleted = deleted_total, "purged assets");

    let output = AssetPurgeOutput { deleted: deleted_total };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output_json;
    use quizasset_core::AssetRecord;

    fn make_test_asset(url: &str) -> AssetRecord {
        AssetRecord::new(url, "image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_purge_requires_selector() {
        let db = AssetDb::open_in_memory().await.unwrap();
        let result = purge_impl(&db, AssetPurgeParams::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_purge_rejects_blank_domain() {
        let db = AssetDb::open_in_memory().await.unwrap();
        let params = AssetPurgeParams { domain: Some("  ".into()), ..Default::default() };
        assert!(purge_impl(&db, params).await.is_err());
    }

    #[tokio::test]
    async fn test_purge_by_digest_and_domain() {
        let db = AssetDb::open_in_memory().await.unwrap();
        let a = make_test_asset("https://example.com/a.png");
        let b = make_test_asset("other.org/b.png");
        let c = make_test_asset("other.org/c.png");
        for record in [&a, &b, &c] {
            db.insert_asset(record).await.unwrap();
        }

        let params = AssetPurgeParams { digest: Some(a.digest.clone()), domain: Some("other.org".into()) };
        let result = purge_impl(&db, params).await.unwrap();

        assert_eq!(output_json(&result)["deleted"], 3);
        assert_eq!(db.count_assets().await.unwrap(), 0);
    }
}
