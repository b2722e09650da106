//! Content-type allow-list for fetched assets.

use quizasset_core::{AppConfig, ConfigError};
use regex::{RegexSet, RegexSetBuilder};

/// Decides which fetched resources may be cached.
///
/// Patterns are matched against the media type only: parameters such as
/// `; charset=utf-8` are stripped and the value is trimmed and lowercased.
/// A missing Content-Type is never accepted.
#[derive(Debug, Clone)]
pub struct ContentTypePolicy {
    patterns: RegexSet,
}

impl ContentTypePolicy {
    /// Build a policy from an already compiled pattern set.
    pub fn new(patterns: RegexSet) -> Self {
        Self { patterns }
    }

    /// Build the policy described by `accepted_content_types`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.accepted_content_type_set().map(Self::new)
    }

    /// Accept any `image/*` type.
    pub fn images_only() -> Self {
        let patterns = RegexSetBuilder::new(["^image/"])
            .case_insensitive(true)
            .build()
            .expect("invalid image pattern");
        Self::new(patterns)
    }

    /// Whether a response declaring `content_type` may be cached.
    pub fn accepts(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return false;
        };
        let media_type = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        !media_type.is_empty() && self.patterns.is_match(&media_type)
    }
}

impl Default for ContentTypePolicy {
    fn default() -> Self {
        Self::images_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_only() {
        let policy = ContentTypePolicy::images_only();
        assert!(policy.accepts(Some("image/png")));
        assert!(policy.accepts(Some("image/svg+xml")));
        assert!(policy.accepts(Some("Image/JPEG; q=0.9")));
        assert!(!policy.accepts(Some("text/html")));
        assert!(!policy.accepts(Some("application/octet-stream")));
        assert!(!policy.accepts(Some("text/html; note=image/png")));
    }

    #[test]
    fn test_missing_or_blank_content_type() {
        let policy = ContentTypePolicy::default();
        assert!(!policy.accepts(None));
        assert!(!policy.accepts(Some("")));
        assert!(!policy.accepts(Some(" ; charset=utf-8")));
    }

    #[test]
    fn test_from_config_patterns() {
        let config = AppConfig {
            accepted_content_types: vec!["^image/(png|gif)$".into(), "^video/mp4$".into()],
            ..Default::default()
        };
        let policy = ContentTypePolicy::from_config(&config).unwrap();
        assert!(policy.accepts(Some("image/png")));
        assert!(policy.accepts(Some("video/mp4")));
        assert!(!policy.accepts(Some("image/jpeg")));
    }

    #[test]
    fn test_from_config_invalid_pattern() {
        let config = AppConfig { accepted_content_types: vec!["(".into()], ..Default::default() };
        assert!(ContentTypePolicy::from_config(&config).is_err());
    }
}
