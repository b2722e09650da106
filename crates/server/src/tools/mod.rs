//! MCP tool implementations.
//!
//! This module contains all tools exposed by the quiz-assets server.

pub mod asset;
pub mod resolve;
pub mod rewrite;

#[cfg(test)]
pub(crate) mod test_support {
    use rmcp::model::CallToolResult;
    use std::sync::Arc;

    use quizasset_client::{AssetCache, FetchClient, FetchConfig};
    use quizasset_core::AssetDb;

    pub async fn test_cache() -> (AssetDb, AssetCache) {
        let db = AssetDb::open_in_memory().await.unwrap();
        let fetcher = FetchClient::new(FetchConfig::default()).unwrap();
        let cache = AssetCache::new(Arc::new(db.clone()), Arc::new(fetcher), "/assets");
        (db, cache)
    }

    pub fn output_json(result: &CallToolResult) -> serde_json::Value {
        let text = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default();
        serde_json::from_str(&text).unwrap()
    }
}
