//! Seeding a fresh record store from previously cleaned output

use crate::storage::traits::{StorageError, StorageResult};
use std::path::Path;

/// Copies previously cleaned output forward when the store does not exist yet
///
/// Returns `true` if the store was seeded. An existing store is left
/// untouched, as is a missing seed file.
pub fn seed_store(store: &Path, seed: Option<&Path>) -> StorageResult<bool> {
    if store.exists() {
        return Ok(false);
    }

    let Some(seed) = seed else {
        return Ok(false);
    };

    if !seed.is_file() {
        tracing::debug!("No cleaned output at {}, nothing to seed", seed.display());
        return Ok(false);
    }

    let bytes = std::fs::copy(seed, store).map_err(|e| StorageError::io(store, e))?;
    tracing::info!(
        "Copied cleaned results from {} to new record store ({} bytes)",
        seed.display(),
        bytes
    );
    Ok(true)
}
