//! Core types and shared functionality for quiz-assets.
//!
//! This crate provides:
//! - The asset record, store trait and SQLite-backed store
//! - URL digest computation
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{AssetDb, AssetMeta, AssetRecord, AssetStore, digest};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
