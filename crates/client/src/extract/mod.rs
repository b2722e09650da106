//! Text scanning for embedded resource URLs.
//!
//! Quiz and answer text is free-form, so references are found with a fixed
//! pattern rather than a markup parser. The scheme is optional: both
//! `http://example.com/pic.png` and bare `example.com/pic.png` are found.

pub mod urls;

pub use urls::{UrlMatch, extract_urls};
