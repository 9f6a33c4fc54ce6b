//! Storage module for persisting resolved records
//!
//! This module handles the durable CSV record store, including:
//! - Header initialization and append-only batch writes
//! - Seeding a fresh store from previously cleaned output
//! - Computing the set of completed items for resumption
//! - Buffering records and flushing them in fixed-size batches

mod csv_store;
mod resume;
mod seed;
mod sink;
mod traits;

pub use csv_store::CsvFileStore;
pub use resume::{compute_completed, read_completed};
pub use seed::seed_store;
pub use sink::IncrementalSink;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::dataset::parse_item_id;
use crate::state::ResolvedRecord;
use serde::Deserialize;

/// Header row of the record store
pub const STORE_HEADER: [&str; 3] = ["owner", "item", "resource_url"];

/// One store row as read back from disk
///
/// Older output used `user,id,photo_url` headers; those names are accepted
/// as aliases.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRow {
    #[serde(alias = "user", default)]
    pub owner: Option<String>,

    #[serde(alias = "id", default)]
    pub item: Option<String>,

    #[serde(alias = "photo_url", default)]
    pub resource_url: Option<String>,
}

impl StoreRow {
    /// Returns the item id if this row has a non-empty owner, item id, and
    /// resource locator
    pub fn completed_item(&self) -> Option<u64> {
        self.owner.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        self.locator()?;
        parse_item_id(self.item.as_deref()?)
    }

    /// The stored locator, treating empty fields and a literal `null` as absent
    pub fn locator(&self) -> Option<&str> {
        self.resource_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "null")
    }
}

/// Serializes a record as one CSV line: `owner,item,resource_url\n`
///
/// A missing locator is written as an empty field.
pub fn serialize_record(record: &ResolvedRecord) -> StorageResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record([
        record.owner_id.as_str(),
        &record.item_id.to_string(),
        record.resource_url.as_deref().unwrap_or(""),
    ])?;
    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}
