//! SQLite-backed content-addressed cache for remote quiz assets.
//!
//! This module provides a persistent asset store using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - URL-addressed storage using SHA-256 digests
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Insert-once records guarded by a uniqueness constraint on the digest

pub mod assets;
pub mod connection;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use assets::{AssetMeta, AssetRecord};
pub use connection::AssetDb;
pub use hash::{digest, is_valid_digest};
pub use store::AssetStore;
