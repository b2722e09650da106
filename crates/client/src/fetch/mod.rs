//! HTTP fetch pipeline for remote assets.
//!
//! ### URL Canonicalization
//! - Trim whitespace, ensure scheme (default: `http`)
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Safety Gates
//! - Deny private ranges (RFC1918, link-local, localhost, etc.) unless allowed.
//! - Resolve DNS and validate all A/AAAA answers are public, both up front
//!   and inside the client's own resolver.
//! - Re-check every redirect target.
//! - Max redirects: 5
//! - Max body bytes: 10MB (configurable)
//! - Whole-request timeout; a timeout is reported like any other fetch error.

pub mod ssrf;
pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use ssrf::{PublicResolver, SsrfError, validate_host, validate_ip, validate_redirect};
pub use url::{UrlError, canonicalize};

use quizasset_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "quiz-assets/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Request timeout (default: 15s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Whether loopback/private addresses may be fetched (default: false)
    pub allow_private_networks: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            allow_private_networks: config.allow_private_networks,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The canonical URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Retrieves the bytes and content type behind a URL.
///
/// Any failure (network, timeout, non-2xx status, oversized body, refused
/// address) is returned as an error for the caller to recover from.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, Error>;
}

/// HTTP fetch client with safety checks.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(redirect_policy(config.max_redirects, config.allow_private_networks))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if !config.allow_private_networks {
            builder = builder.dns_resolver(Arc::new(PublicResolver));
        }

        let http = builder
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_inner(&self, url: Url, start: Instant) -> Result<FetchResponse, Error> {
        if !self.config.allow_private_networks {
            validate_host(&url).await.map_err(|e| Error::SsrfBlocked(e.to_string()))?;
        }

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "image/*,*/*;q=0.5")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { url, final_url, status, content_type, bytes, fetch_ms })
    }
}

#[async_trait::async_trait]
impl Fetcher for FetchClient {
    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Performs the address check and respects redirect, byte and time limits.
    async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = canonicalize(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        match tokio::time::timeout(self.config.timeout, self.fetch_inner(url, start)).await {
            Ok(result) => result,
            Err(_) => Err(Error::FetchTimeout(format!("{url_str} after {}ms", self.config.timeout.as_millis()))),
        }
    }
}

/// Follow at most `max_redirects` hops, re-checking each target's address.
fn redirect_policy(max_redirects: usize, allow_private_networks: bool) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(format!("too many redirects (max {max_redirects})"));
        }
        if !allow_private_networks && let Err(e) = validate_redirect(attempt.url()) {
            return attempt.error(e);
        }
        attempt.follow()
    })
}

fn map_reqwest_error(err: reqwest::Error) -> Error {
    let mut source = std::error::Error::source(&err);
    while let Some(inner) = source {
        if let Some(blocked) = inner.downcast_ref::<SsrfError>() {
            return Error::SsrfBlocked(blocked.to_string());
        }
        source = inner.source();
    }

    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::HttpError(format!("network error: {err}")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "quiz-assets/0.1");
        assert_eq!(config.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(15_000));
        assert_eq!(config.max_redirects, 5);
        assert!(!config.allow_private_networks);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { timeout_ms: 250, allow_private_networks: true, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert!(config.allow_private_networks);
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_scheme() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let result = client.fetch("ftp://example.com/pic.png").await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_blocks_private_address() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let result = client.fetch("127.0.0.1/pic.png").await;
        assert!(matches!(result, Err(Error::SsrfBlocked(_))));
        assert!(result.unwrap_err().is_fetch_error());
    }
}
