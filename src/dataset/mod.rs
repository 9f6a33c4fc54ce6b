//! Source dataset loading and backlog filtering
//!
//! The dataset is a CSV file with (at least) an owner column `user` and an
//! item column `id`; every other column is ignored. Loading failures are
//! fatal for a run, while individual rows missing either field are only
//! counted and skipped.

use crate::state::{CompletedSet, WorkItem};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that abort a run before any work is scheduled
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// One dataset row as it appears on disk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRow {
    #[serde(alias = "owner", default)]
    pub user: Option<String>,

    #[serde(alias = "item", default)]
    pub id: Option<String>,
}

impl SourceRow {
    /// Converts the row into a work item if both fields are present
    pub fn work_item(&self) -> Option<WorkItem> {
        let owner = self.user.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let item_id = parse_item_id(self.id.as_deref()?)?;
        Some(WorkItem::new(owner, item_id))
    }
}

/// Parses an item id column, tolerating surrounding whitespace and a
/// trailing `.0` left behind by spreadsheet exports
pub fn parse_item_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let digits = raw.strip_suffix(".0").unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Loaded dataset rows in file order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<SourceRow>,

    /// Records that could not be decoded at all
    pub unreadable_rows: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Work list left after removing completed and incomplete rows
#[derive(Debug, Clone, Default)]
pub struct Backlog {
    pub items: Vec<WorkItem>,
    pub already_completed: usize,
    pub missing_fields: usize,
}

/// Loads the source dataset
///
/// # Errors
///
/// Returns `DatasetError` if the file cannot be opened, its header cannot be
/// read, or it lacks the owner/item columns.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_dataset(file)
}

pub(crate) fn read_dataset<R: std::io::Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let has = |names: &[&str]| headers.iter().any(|h| names.contains(&h));
    if !has(&["user", "owner"]) {
        return Err(DatasetError::MissingColumn("user"));
    }
    if !has(&["id", "item"]) {
        return Err(DatasetError::MissingColumn("id"));
    }

    let mut dataset = Dataset::default();
    for (index, result) in reader.deserialize::<SourceRow>().enumerate() {
        match result {
            Ok(row) => dataset.rows.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::debug!("Skipping unreadable dataset record {}: {}", index + 1, e);
                dataset.unreadable_rows += 1;
            }
        }
    }

    Ok(dataset)
}

/// Filters the dataset down to items that still need resolving
///
/// Rows whose id is in `completed` are dropped silently; rows missing the
/// owner or id are dropped with a warning.
pub fn build_backlog(dataset: &Dataset, completed: &CompletedSet) -> Backlog {
    let mut backlog = Backlog::default();

    for row in &dataset.rows {
        let Some(item) = row.work_item() else {
            tracing::warn!(
                "Missing user or id for row: user={:?} id={:?}",
                row.user,
                row.id
            );
            backlog.missing_fields += 1;
            continue;
        };

        if completed.contains(&item.item_id) {
            backlog.already_completed += 1;
            continue;
        }

        backlog.items.push(item);
    }

    backlog
}
