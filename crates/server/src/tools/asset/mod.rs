//! Administrative asset tools.
//!
//! These operate on the store directly and are not part of the cache pipeline.

pub mod get;
pub mod purge;

pub use get::{AssetGetParams, get_impl};
pub use purge::{AssetPurgeParams, purge_impl};
