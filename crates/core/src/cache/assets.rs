//! Asset record type and its SQLite operations.

use super::connection::AssetDb;
use super::hash::{digest, is_valid_digest};
use super::store::AssetStore;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, ErrorCode, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "SELECT digest, url, mime_type, data, created_at FROM assets";
const SELECT_META_COLUMNS: &str = "SELECT digest, url, mime_type, byte_size, created_at FROM assets";

/// One cached remote resource.
///
/// Created once, the first time a URL is fetched and accepted, and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub digest: String,
    pub url: String,
    pub mime_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub created_at: String,
}

impl AssetRecord {
    /// Build a record for `url`, deriving its digest.
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let url = url.into();
        Self {
            digest: digest(&url),
            url,
            mime_type: mime_type.into(),
            data: data.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Check structural constraints before persisting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAsset`] if the digest is malformed or does not
    /// belong to the URL, or if the URL, MIME type or body is empty.
    pub fn validate(&self) -> Result<(), Error> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidAsset("url must not be empty".into()));
        }
        if !is_valid_digest(&self.digest) {
            return Err(Error::InvalidAsset(format!("malformed digest {:?}", self.digest)));
        }
        if self.digest != digest(&self.url) {
            return Err(Error::InvalidAsset(format!("digest does not match url {}", self.url)));
        }
        if self.mime_type.trim().is_empty() {
            return Err(Error::InvalidAsset("mime_type must not be empty".into()));
        }
        if self.data.is_empty() {
            return Err(Error::InvalidAsset("data must not be empty".into()));
        }
        Ok(())
    }

    /// Size of the cached body in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            digest: row.get(0)?,
            url: row.get(1)?,
            mime_type: row.get(2)?,
            data: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

/// Everything about a stored asset except its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    pub digest: String,
    pub url: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub created_at: String,
}

impl AssetMeta {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            digest: row.get(0)?,
            url: row.get(1)?,
            mime_type: row.get(2)?,
            byte_size: row.get::<_, i64>(3)? as u64,
            created_at: row.get(4)?,
        })
    }
}

impl From<&AssetRecord> for AssetMeta {
    fn from(record: &AssetRecord) -> Self {
        Self {
            digest: record.digest.clone(),
            url: record.url.clone(),
            mime_type: record.mime_type.clone(),
            byte_size: record.byte_size() as u64,
            created_at: record.created_at.clone(),
        }
    }
}

impl AssetDb {
    /// Insert a new asset.
    ///
    /// Fails with [`Error::DuplicateAsset`] if a record with the same digest
    /// already exists; the existing record is never overwritten.
    pub async fn insert_asset(&self, record: &AssetRecord) -> Result<(), Error> {
        record.validate()?;
        let record = record.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let result = conn.execute(
                    "INSERT INTO assets (digest, url, mime_type, data, byte_size, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        &record.digest,
                        &record.url,
                        &record.mime_type,
                        &record.data,
                        record.data.len() as i64,
                        &record.created_at,
                    ],
                );

                match result {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                        Err(Error::DuplicateAsset(record.digest))
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get an asset by digest.
    ///
    /// Returns None if the digest doesn't exist in the store.
    pub async fn find_by_digest(&self, digest: &str) -> Result<Option<AssetRecord>, Error> {
        let digest = digest.to_string();
        self.conn
            .call(move |conn| -> Result<Option<AssetRecord>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE digest = ?1"))?;
                Ok(stmt.query_row(params![digest], AssetRecord::from_row).optional()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Get an asset by source URL.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<AssetRecord>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<AssetRecord>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE url = ?1 LIMIT 1"))?;
                Ok(stmt.query_row(params![url], AssetRecord::from_row).optional()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether an asset with `digest` is stored. Never reads the body.
    pub async fn has_digest(&self, digest: &str) -> Result<bool, Error> {
        let digest = digest.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM assets WHERE digest = ?1)", params![digest], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Get an asset's metadata by digest, without its body.
    pub async fn find_meta_by_digest(&self, digest: &str) -> Result<Option<AssetMeta>, Error> {
        let digest = digest.to_string();
        self.conn
            .call(move |conn| -> Result<Option<AssetMeta>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_META_COLUMNS} WHERE digest = ?1"))?;
                Ok(stmt.query_row(params![digest], AssetMeta::from_row).optional()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Get an asset's metadata by source URL, without its body.
    pub async fn find_meta_by_url(&self, url: &str) -> Result<Option<AssetMeta>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<AssetMeta>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_META_COLUMNS} WHERE url = ?1 LIMIT 1"))?;
                Ok(stmt.query_row(params![url], AssetMeta::from_row).optional()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a single asset.
    ///
    /// Returns true if a record was removed.
    pub async fn delete_asset(&self, digest: &str) -> Result<bool, Error> {
        let digest = digest.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM assets WHERE digest = ?1", params![digest])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete assets whose source URL's host is `domain` or one of its subdomains.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_assets_by_domain(&self, domain: &str) -> Result<u64, Error> {
        let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
        if domain.is_empty() {
            return Ok(0);
        }
        let pattern = format!("%{}%", escape_like(&domain));

        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let digests = {
                    let mut stmt = tx.prepare("SELECT digest, url FROM assets WHERE url LIKE ?1 ESCAPE '\\'")?;
                    let rows = stmt.query_map(params![pattern], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })?;

                    let mut digests = Vec::new();
                    for row in rows {
                        let (digest, url) = row?;
                        if host_in_domain(&url_host(&url), &domain) {
                            digests.push(digest);
                        }
                    }
                    digests
                };

                let mut deleted = 0u64;
                for digest in &digests {
                    deleted += tx.execute("DELETE FROM assets WHERE digest = ?1", params![digest])? as u64;
                }
                tx.commit()?;
                Ok(deleted)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored assets.
    pub async fn count_assets(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

/// Escape `LIKE` wildcards for a pattern used with `ESCAPE '\'`.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lowercased host of a stored URL, which may or may not carry a scheme.
fn url_host(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host.split(':').next().unwrap_or_default().to_ascii_lowercase()
}

fn host_in_domain(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|prefix| prefix.ends_with('.'))
}

#[async_trait::async_trait]
impl AssetStore for AssetDb {
    async fn create_asset(&self, record: &AssetRecord) -> Result<AssetRecord, Error> {
        self.insert_asset(record).await?;
        Ok(record.clone())
    }

    async fn get_asset_by_digest(&self, digest: &str) -> Result<Option<AssetRecord>, Error> {
        self.find_by_digest(digest).await
    }

    async fn get_asset_by_url(&self, url: &str) -> Result<Option<AssetRecord>, Error> {
        self.find_by_url(url).await
    }

    async fn contains_digest(&self, digest: &str) -> Result<bool, Error> {
        self.has_digest(digest).await
    }

    async fn get_asset_meta_by_digest(&self, digest: &str) -> Result<Option<AssetMeta>, Error> {
        self.find_meta_by_digest(digest).await
    }

    async fn get_asset_meta_by_url(&self, url: &str) -> Result<Option<AssetMeta>, Error> {
        self.find_meta_by_url(url).await
    }
}
