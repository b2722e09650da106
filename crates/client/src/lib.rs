//! Client code for quiz-assets.
//!
//! This crate provides the URL extractor, the HTTP fetch pipeline and the
//! asset cache built on top of them, shared by the server and any other
//! content-ingestion caller.

pub mod assets;
pub mod extract;
pub mod fetch;

pub use assets::{Answer, AssetCache, ContentTypePolicy, Question, cache_path, rewrite_questions_with_cached_assets};
pub use extract::{UrlMatch, extract_urls};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
