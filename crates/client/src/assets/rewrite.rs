//! Text substitution of remote URLs with local cache paths.
//!
//! The read path here never fetches and never writes: it only resolves URLs
//! that are already in the store.

use std::collections::HashMap;

use quizasset_core::{AssetStore, Error};

use super::quiz::{Answer, Question};
use crate::extract::{UrlMatch, extract_urls};

/// Local path under which an asset with `digest` is served.
pub fn cache_path(assets_base_path: &str, digest: &str) -> String {
    format!("{}/{}", assets_base_path.trim_end_matches('/'), digest)
}

/// Replace every match whose URL `lookup` resolves; leave the rest verbatim.
///
/// `matches` must come from [`extract_urls`] over the same `text`.
pub(crate) fn rewrite_matches<'a>(
    text: &str, matches: &[UrlMatch], lookup: impl Fn(&str) -> Option<&'a str>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for m in matches {
        if let Some(replacement) = lookup(&m.url) {
            out.push_str(&text[cursor..m.span.start]);
            out.push_str(replacement);
            cursor = m.span.end;
        }
    }

    out.push_str(&text[cursor..]);
    out
}

/// Rewrite question and answer text to point at already-cached assets.
///
/// Each embedded URL is looked up by URL (not digest). Found URLs become
/// `{assets_base_path}/{digest}`; unknown URLs are left unchanged. Returns
/// rewritten copies, leaving `questions` untouched.
///
/// # Errors
///
/// Returns the store error if a lookup fails; no partial result is returned.
pub async fn rewrite_questions_with_cached_assets(
    store: &dyn AssetStore, assets_base_path: &str, questions: &[Question],
) -> Result<Vec<Question>, Error> {
    let mut paths: HashMap<String, Option<String>> = HashMap::new();

    for question in questions {
        for text in question.texts() {
            for m in extract_urls(text) {
                if paths.contains_key(&m.url) {
                    continue;
                }
                let path = store
                    .get_asset_meta_by_url(&m.url)
                    .await?
                    .map(|meta| cache_path(assets_base_path, &meta.digest));
                paths.insert(m.url, path);
            }
        }
    }

    let rewrite = |text: &str| {
        rewrite_matches(text, &extract_urls(text), |url| paths.get(url).and_then(|p| p.as_deref()))
    };

    Ok(questions
        .iter()
        .map(|q| Question {
            text: rewrite(&q.text),
            answers: q
                .answers
                .iter()
                .map(|a| Answer { text: rewrite(&a.text) })
                .collect(),
        })
        .collect())
}
