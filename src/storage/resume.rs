//! Resume tracking: which items earlier runs already resolved

use crate::state::CompletedSet;
use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::StoreRow;
use std::path::Path;

/// Computes the set of item ids already stored with a non-empty locator
///
/// An absent store yields the empty set. Rows that cannot be decoded or lack
/// an owner, a numeric item id, or a locator are left out, so those items are
/// resolved again.
///
/// # Errors
///
/// Returns `StorageError` only if an existing store cannot be read.
pub fn compute_completed(path: &Path) -> StorageResult<CompletedSet> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No prior output at {}", path.display());
            return Ok(CompletedSet::new());
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };
    read_completed(file)
}

/// Reads completed item ids from CSV content with a header row
pub fn read_completed<R: std::io::Read>(reader: R) -> StorageResult<CompletedSet> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut completed = CompletedSet::new();
    let mut malformed = 0usize;

    for result in reader.deserialize::<StoreRow>() {
        match result {
            Ok(row) => match row.completed_item() {
                Some(item_id) => {
                    completed.insert(item_id);
                }
                None => malformed += 1,
            },
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => malformed += 1,
        }
    }

    if malformed > 0 {
        tracing::debug!("{} stored rows are not completed", malformed);
    }

    Ok(completed)
}
