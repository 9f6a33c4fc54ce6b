//! Shutter-Sweep: a resumable photo locator harvester
//!
//! This crate walks a dataset of (owner, item) pairs, renders each item's
//! page to discover the image it loads, upgrades small renditions to their
//! full-size variant when one exists, and appends the results to a CSV store
//! that later runs resume from.

pub mod config;
pub mod crawler;
pub mod dataset;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Shutter-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] dataset::DatasetError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid page template: {0}")]
    InvalidTemplate(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Failures reported by the rendering and probing capabilities
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("Failed to open render session: {0}")]
    Launch(String),

    #[error("Navigation to {address} failed: {reason}")]
    Navigation { address: String, reason: String },

    #[error("Existence probe for {url} failed: {reason}")]
    Probe { url: String, reason: String },

    #[error("Resolution timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid page address: {0}")]
    InvalidAddress(#[from] UrlError),
}

/// A single item's resolution failed
///
/// Always recoverable: the scheduler records the item with an empty locator
/// and moves on.
#[derive(Debug, Error)]
#[error("Resolution failed for {owner_id}/{item_id}: {source}")]
pub struct ResolutionError {
    pub owner_id: String,
    pub item_id: u64,
    #[source]
    pub source: CapabilityError,
}

/// Result type alias for Shutter-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{CompletedSet, ItemOutcome, ProgressState, ResolvedRecord, WorkItem};
