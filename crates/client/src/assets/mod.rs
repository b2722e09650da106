//! Remote-asset cache pipeline.
//!
//! Turns text that references remote images into text that references
//! locally cached copies:
//!
//! 1. Extract candidate URLs from the text.
//! 2. Per distinct URL: digest -> store check -> fetch -> content-type gate
//!    -> validate -> persist. Distinct URLs run concurrently, bounded by
//!    `max_concurrency`; each URL's own steps run in order.
//! 3. Rewrite every occurrence of a resolved URL to `{assets_base_path}/{digest}`.
//!
//! Per-URL failures are logged and leave that URL's text untouched. The
//! store's uniqueness constraint on the digest settles concurrent first
//! fetches of the same URL: the losing insert is treated as a cache hit.

pub mod policy;
pub mod quiz;
pub mod rewrite;

pub use policy::ContentTypePolicy;
pub use quiz::{Answer, Question};
pub use rewrite::{cache_path, rewrite_questions_with_cached_assets};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use quizasset_core::{AppConfig, AssetRecord, AssetStore, ConfigError, Error, digest};

use crate::extract::extract_urls;
use crate::fetch::Fetcher;
use rewrite::rewrite_matches;

const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Asset cache orchestrator.
///
/// Holds the store and fetcher it was constructed with for its whole
/// lifetime; clones of the `Arc`s may be shared with other components.
#[derive(Clone)]
pub struct AssetCache {
    store: Arc<dyn AssetStore>,
    fetcher: Arc<dyn Fetcher>,
    assets_base_path: String,
    policy: ContentTypePolicy,
    max_concurrency: usize,
}

impl AssetCache {
    /// Create a cache that accepts images only.
    pub fn new(store: Arc<dyn AssetStore>, fetcher: Arc<dyn Fetcher>, assets_base_path: impl Into<String>) -> Self {
        Self {
            store,
            fetcher,
            assets_base_path: assets_base_path.into(),
            policy: ContentTypePolicy::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Create a cache using the base path, allow-list and concurrency from `config`.
    pub fn from_config(
        store: Arc<dyn AssetStore>, fetcher: Arc<dyn Fetcher>, config: &AppConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(store, fetcher, config.assets_base_path.clone())
            .with_policy(ContentTypePolicy::from_config(config)?)
            .with_max_concurrency(config.max_concurrency))
    }

    pub fn with_policy(mut self, policy: ContentTypePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound on distinct URLs resolved at once; clamped to at least 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn assets_base_path(&self) -> &str {
        &self.assets_base_path
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// Fetch and cache every remote asset referenced in `text`, returning
    /// the text with each cached reference rewritten to its local path.
    ///
    /// Never fails: URLs that cannot be fetched, are not accepted, or cannot
    /// be stored are left exactly as written.
    pub async fn resolve_and_cache_assets(&self, text: &str) -> String {
        let matches = extract_urls(text);
        if matches.is_empty() {
            return text.to_string();
        }

        let mut seen = HashSet::new();
        let distinct: Vec<&str> = matches
            .iter()
            .map(|m| m.url.as_str())
            .filter(|url| seen.insert(*url))
            .collect();

        let resolved: HashMap<String, String> = stream::iter(distinct.into_iter().map(str::to_owned))
            .map(|url| async move {
                let path = self.resolve_url(&url).await;
                (url, path)
            })
            .buffer_unordered(self.max_concurrency)
            .filter_map(|(url, path)| async move { path.map(|p| (url, p)) })
            .collect()
            .await;

        tracing::debug!(found = matches.len(), rewritten = resolved.len(), "resolved embedded assets");

        rewrite_matches(text, &matches, |url| resolved.get(url).map(String::as_str))
    }

    /// Rewrite questions against already-cached assets without fetching.
    ///
    /// See [`rewrite_questions_with_cached_assets`].
    pub async fn rewrite_questions(&self, questions: &[Question]) -> Result<Vec<Question>, Error> {
        rewrite_questions_with_cached_assets(self.store.as_ref(), &self.assets_base_path, questions).await
    }

    async fn resolve_url(&self, url: &str) -> Option<String> {
        match self.cache_url(url).await {
            Ok(digest) => Some(cache_path(&self.assets_base_path, &digest)),
            Err(e) => {
                tracing::warn!(url, error = %e, "leaving asset url unrewritten");
                None
            }
        }
    }

    /// Make sure `url` is in the store and return the digest to link to.
    async fn cache_url(&self, url: &str) -> Result<String, Error> {
        let digest = digest(url);

        if self.store.contains_digest(&digest).await? {
            tracing::debug!(url, digest = %digest, "asset cache hit");
            return Ok(digest);
        }

        let response = self.fetcher.fetch(url).await?;

        let content_type = match response.content_type {
            Some(ct) if self.policy.accepts(Some(&ct)) => ct,
            other => return Err(Error::UnacceptedContentType(other.unwrap_or_else(|| "<missing>".into()))),
        };

        let record = AssetRecord::new(url, content_type, response.bytes.to_vec());
        record.validate()?;

        match self.store.create_asset(&record).await {
            Ok(created) => {
                tracing::info!(
                    url,
                    digest = %created.digest,
                    mime_type = %created.mime_type,
                    bytes = created.byte_size(),
                    fetch_ms = response.fetch_ms,
                    "cached asset"
                );
                Ok(created.digest)
            }
            Err(Error::DuplicateAsset(_)) => {
                let winner = self
                    .store
                    .get_asset_meta_by_digest(&record.digest)
                    .await?
                    .ok_or_else(|| Error::CacheMiss(record.digest.clone()))?;
                tracing::debug!(url, digest = %winner.digest, "asset stored concurrently; using existing record");
                Ok(winner.digest)
            }
            Err(e) => Err(e),
        }
    }
}
