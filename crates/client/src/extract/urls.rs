//! URL matching over free-form text.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Optional scheme, one or more host labels, an alphabetic extension,
/// then an optional port, path and query.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:https?://)?(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,12}\b(?::\d{1,5})?(?:/[\w\-.~%+@=:,;!$]*)*(?:\?[\w\-.~%+@=:,;!$&/]*)?",
    )
    .expect("invalid url pattern")
});

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// A match directly after one of these is the tail of a longer token: a
/// protocol-relative or non-http URL (`//`, `ftp://`), an e-mail domain,
/// or a host glued to `_`/`-`/`.`.
const FOREIGN_PREFIX: &[char] = &['/', '@', '.', '-', '_', '\\'];

/// Whether the match at `start..end` stands on its own in `text`.
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| FOREIGN_PREFIX.contains(&c)) && after != Some('@')
}

/// A URL found in text, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    /// The matched substring, exactly as written.
    pub url: String,
    /// Byte range of the match in the scanned text.
    pub span: Range<usize>,
}

/// Find embedded resource URLs in `text`, in order of appearance.
///
/// Matching is case-insensitive. Trailing sentence punctuation is not part
/// of a match. Host-like text that is only part of a longer token is
/// skipped: both halves of an e-mail address, protocol-relative URLs and
/// URLs with a scheme other than http(s). No match is a normal outcome and
/// yields an empty vector.
pub fn extract_urls(text: &str) -> Vec<UrlMatch> {
    URL_PATTERN
        .find_iter(text)
        .filter(|m| is_standalone(text, m.start(), m.end()))
        .filter_map(|m| {
            let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            if url.is_empty() {
                return None;
            }
            let span = m.start()..m.start() + url.len();
            Some(UrlMatch { url: url.to_string(), span })
        })
        .collect()
}
