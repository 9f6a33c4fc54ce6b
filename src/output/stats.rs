//! Statistics generation from the record store
//!
//! This module provides functionality for summarizing what earlier runs
//! have written to the CSV store.

use crate::storage::{StorageError, StorageResult, StoreRow};
use crate::url::LocatorRules;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Record store statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of decoded rows
    pub total_rows: u64,

    /// Rows carrying a locator
    pub with_locator: u64,

    /// Rows whose locator is empty or `null`
    pub without_locator: u64,

    /// Locators that still point at the small rendition
    pub small_locators: u64,

    /// Number of distinct owners
    pub distinct_owners: u64,

    /// Rows repeating an item id seen earlier in the store
    pub duplicate_items: u64,

    /// Rows that could not be decoded
    pub malformed_rows: u64,
}

impl StoreStatistics {
    /// Share of rows with a locator, in percent
    pub fn coverage(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.with_locator as f64 / self.total_rows as f64 * 100.0
        }
    }
}

/// Loads statistics from the store at `path`
///
/// # Errors
///
/// Returns `StorageError` if the store cannot be opened or read.
pub fn load_statistics(path: &Path, rules: &LocatorRules) -> StorageResult<StoreStatistics> {
    let file = std::fs::File::open(path).map_err(|e| StorageError::io(path, e))?;
    read_statistics(file, rules)
}

/// Computes statistics from CSV content with a header row
pub fn read_statistics<R: std::io::Read>(
    reader: R,
    rules: &LocatorRules,
) -> StorageResult<StoreStatistics> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut stats = StoreStatistics::default();
    let mut owners = HashSet::new();
    let mut items: HashMap<String, u64> = HashMap::new();

    for result in reader.deserialize::<StoreRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => {
                stats.malformed_rows += 1;
                continue;
            }
        };

        stats.total_rows += 1;

        match row.locator() {
            Some(locator) => {
                stats.with_locator += 1;
                if rules.is_small_variant(locator) {
                    stats.small_locators += 1;
                }
            }
            None => stats.without_locator += 1,
        }

        if let Some(owner) = row.owner.as_deref().filter(|s| !s.is_empty()) {
            owners.insert(owner.to_string());
        }

        if let Some(item) = row.item.as_deref().filter(|s| !s.is_empty()) {
            *items.entry(item.to_string()).or_insert(0) += 1;
        }
    }

    stats.distinct_owners = owners.len() as u64;
    stats.duplicate_items = items.values().map(|count| count - 1).sum();

    Ok(stats)
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Record Store Statistics ===\n");

    println!("Overview:");
    println!("  Total rows: {}", stats.total_rows);
    println!("  Distinct owners: {}", stats.distinct_owners);
    println!();

    println!("Locators:");
    println!(
        "  With locator: {} ({:.1}%)",
        stats.with_locator,
        stats.coverage()
    );
    println!("  Without locator: {}", stats.without_locator);
    println!("  Still small rendition: {}", stats.small_locators);
    println!();

    if stats.duplicate_items > 0 || stats.malformed_rows > 0 {
        println!("Anomalies:");
        println!("  Duplicate item rows: {}", stats.duplicate_items);
        println!("  Malformed rows: {}", stats.malformed_rows);
        println!();
    }
}
