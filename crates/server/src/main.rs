//! quiz-assets server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use quizasset_client::{AssetCache, FetchClient, FetchConfig};
use quizasset_core::{AppConfig, AssetDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = AssetDb::open(&config.db_path).await?;
    let fetcher = FetchClient::new(FetchConfig::from(&config))?;
    let cache = AssetCache::from_config(Arc::new(db.clone()), Arc::new(fetcher), &config)?;

    tracing::info!(
        db_path = %config.db_path.display(),
        assets_base_path = %config.assets_base_path,
        "Starting quiz-assets server on stdio transport"
    );

    let handler = handler::QuizAssetServer::new(db, cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
