//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::asset::{AssetGetParams, AssetPurgeParams, get_impl, purge_impl};
use crate::tools::resolve::{AssetsResolveParams, resolve_impl};
use crate::tools::rewrite::{RewriteQuestionsParams, rewrite_impl};

use quizasset_client::AssetCache;
use quizasset_core::AssetDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for quiz-assets.
#[derive(Clone)]
pub struct QuizAssetServer {
    db: AssetDb,
    cache: AssetCache,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl QuizAssetServer {
    /// Create a new server handler around an opened store and its cache pipeline.
    pub fn new(db: AssetDb, cache: AssetCache) -> Self {
        Self { db, cache, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Fetch and cache images referenced in text. Returns the text with cached references rewritten to local asset paths; unreachable or non-image URLs are left as written."
    )]
    async fn assets_resolve(&self, params: Parameters<AssetsResolveParams>) -> Result<CallToolResult, McpError> {
        resolve_impl(&self.cache, params.0).await
    }

    #[tool(
        description = "Rewrite question and answer text to point at already-cached assets. Performs no network access and no writes."
    )]
    async fn assets_rewrite_questions(
        &self, params: Parameters<RewriteQuestionsParams>,
    ) -> Result<CallToolResult, McpError> {
        rewrite_impl(&self.cache, params.0).await
    }

    #[tool(description = "Get metadata of a cached asset by digest.")]
    async fn asset_get(&self, params: Parameters<AssetGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.db, self.cache.assets_base_path(), params.0).await
    }

    #[tool(description = "Delete cached assets by digest or by source domain.")]
    async fn asset_purge(&self, params: Parameters<AssetPurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.db, params.0).await
    }
}

impl ServerHandler for QuizAssetServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "quiz-assets".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
