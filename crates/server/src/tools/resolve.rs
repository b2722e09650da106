//! assets_resolve tool implementation.
//!
//! Fetches and caches the images referenced in newly submitted text.

use quizasset_client::AssetCache;
use quizasset_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for the assets_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetsResolveParams {
    /// Free-form question or answer text that may embed image URLs.
    pub text: String,
}

/// Output structure for the assets_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetsResolveOutput {
    /// The text with every cached reference rewritten to its local path.
    pub text: String,
}

/// Implementation of the assets_resolve tool.
///
/// Per-URL failures never fail the call; they only leave that URL as written.
pub async fn resolve_impl(cache: &AssetCache, params: AssetsResolveParams) -> Result<CallToolResult, McpError> {
    let text = cache.resolve_and_cache_assets(&params.text).await;
    let output = AssetsResolveOutput { text };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
