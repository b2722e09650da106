//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (QUIZ_ASSETS_*)
//! 2. TOML config file (if QUIZ_ASSETS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (QUIZ_ASSETS_*)
/// 2. TOML config file (if QUIZ_ASSETS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite asset database.
    ///
    /// Set via QUIZ_ASSETS_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// URL prefix of rewritten cache paths (`{assets_base_path}/{digest}`).
    ///
    /// Set via QUIZ_ASSETS_ASSETS_BASE_PATH environment variable.
    #[serde(default = "default_assets_base_path")]
    pub assets_base_path: String,

    /// Regex allow-list for the media type of fetched assets.
    ///
    /// Matched case-insensitively against the Content-Type header with
    /// parameters stripped. Defaults to images only.
    #[serde(default = "default_accepted_content_types")]
    pub accepted_content_types: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via QUIZ_ASSETS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per asset.
    ///
    /// Set via QUIZ_ASSETS_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via QUIZ_ASSETS_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Distinct URLs resolved concurrently within one call.
    ///
    /// Set via QUIZ_ASSETS_MAX_CONCURRENCY environment variable.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Allow fetching from loopback, private and link-local addresses.
    ///
    /// Set via QUIZ_ASSETS_ALLOW_PRIVATE_NETWORKS environment variable.
    #[serde(default)]
    pub allow_private_networks: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./quiz-assets.sqlite")
}

fn default_assets_base_path() -> String {
    "/assets".into()
}

fn default_accepted_content_types() -> Vec<String> {
    vec!["^image/".into()]
}

fn default_user_agent() -> String {
    "quiz-assets/0.1".into()
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_concurrency() -> usize {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            assets_base_path: default_assets_base_path(),
            accepted_content_types: default_accepted_content_types(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            max_concurrency: default_max_concurrency(),
            allow_private_networks: false,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Compile the content-type allow-list.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any pattern is not a valid regex.
    pub fn accepted_content_type_set(&self) -> Result<RegexSet, ConfigError> {
        RegexSetBuilder::new(&self.accepted_content_types)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::Invalid { field: "accepted_content_types".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `QUIZ_ASSETS_`
    /// 2. TOML file from `QUIZ_ASSETS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("QUIZ_ASSETS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("QUIZ_ASSETS_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./quiz-assets.sqlite"));
        assert_eq!(config.assets_base_path, "/assets");
        assert_eq!(config.accepted_content_types, vec!["^image/".to_string()]);
        assert_eq!(config.user_agent, "quiz-assets/0.1");
        assert_eq!(config.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.max_concurrency, 8);
        assert!(!config.allow_private_networks);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(15_000));
    }

    #[test]
    fn test_accepted_content_type_set_is_case_insensitive() {
        let set = AppConfig::default().accepted_content_type_set().unwrap();
        assert!(set.is_match("image/png"));
        assert!(set.is_match("IMAGE/GIF"));
        assert!(!set.is_match("text/html"));
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("QUIZ_ASSETS_ASSETS_BASE_PATH", "https://cdn.example.com/quiz");
            jail.set_env("QUIZ_ASSETS_MAX_CONCURRENCY", "2");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.assets_base_path, "https://cdn.example.com/quiz");
            assert_eq!(config.max_concurrency, 2);
            assert_eq!(config.user_agent, "quiz-assets/0.1");
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "assets.toml",
                r#"
                    assets_base_path = "/static/cache"
                    accepted_content_types = ["^image/(png|jpeg)$"]
                "#,
            )?;
            jail.set_env("QUIZ_ASSETS_CONFIG_FILE", "assets.toml");
            jail.set_env("QUIZ_ASSETS_TIMEOUT_MS", "500");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.assets_base_path, "/static/cache");
            assert_eq!(config.accepted_content_types, vec!["^image/(png|jpeg)$".to_string()]);
            assert_eq!(config.timeout_ms, 500);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("QUIZ_ASSETS_MAX_CONCURRENCY", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { field, .. }) if field == "max_concurrency"));
            Ok(())
        });
    }
}
