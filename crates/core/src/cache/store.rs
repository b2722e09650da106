//! Asset store abstraction.
//!
//! The cache pipeline and the text rewriter only talk to the store through
//! this trait. [`AssetDb`](super::AssetDb) is the SQLite implementation.

use super::assets::{AssetMeta, AssetRecord};
use crate::Error;

/// Persistence for asset records keyed by digest, with a secondary lookup by URL.
///
/// Implementations must enforce uniqueness on the digest: a second
/// `create_asset` for an existing digest fails with [`Error::DuplicateAsset`]
/// and leaves the stored record untouched.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist a new record.
    async fn create_asset(&self, record: &AssetRecord) -> Result<AssetRecord, Error>;

    /// Look up a record by its digest.
    async fn get_asset_by_digest(&self, digest: &str) -> Result<Option<AssetRecord>, Error>;

    /// Look up a record by the URL it was first fetched from.
    async fn get_asset_by_url(&self, url: &str) -> Result<Option<AssetRecord>, Error>;

    /// Whether a record with `digest` exists, without loading its body.
    async fn contains_digest(&self, digest: &str) -> Result<bool, Error>;

    /// Record metadata by digest, without the body.
    async fn get_asset_meta_by_digest(&self, digest: &str) -> Result<Option<AssetMeta>, Error>;

    /// Record metadata by URL, without the body.
    async fn get_asset_meta_by_url(&self, url: &str) -> Result<Option<AssetMeta>, Error>;
}
