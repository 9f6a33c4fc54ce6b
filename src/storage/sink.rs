//! Incremental sink: batches resolved records into append-only writes

use crate::state::ResolvedRecord;
use crate::storage::serialize_record;
use crate::storage::traits::{RecordStore, StorageResult};

/// Buffers serialized records and appends them to a store in batches
///
/// The buffer is written and cleared as soon as it holds `threshold` lines,
/// so it is always shorter than the threshold between calls. A final
/// [`flush`](Self::flush) writes whatever remains.
#[derive(Debug)]
pub struct IncrementalSink<S> {
    store: S,
    threshold: usize,
    buffer: Vec<String>,
    flushes: usize,
    written: usize,
}

impl<S: RecordStore> IncrementalSink<S> {
    pub fn new(store: S, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            store,
            threshold,
            buffer: Vec::with_capacity(threshold),
            flushes: 0,
            written: 0,
        }
    }

    /// Buffers one record, writing the batch once the threshold is reached
    pub fn append(&mut self, record: ResolvedRecord) -> StorageResult<()> {
        self.buffer.push(serialize_record(&record)?);
        if self.buffer.len() >= self.threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes all buffered lines in one append and clears the buffer
    ///
    /// Returns the number of records written. Calling this with an empty
    /// buffer is allowed and still counts as a flush.
    pub fn flush(&mut self) -> StorageResult<usize> {
        let count = self.buffer.len();
        self.store.append_lines(&self.buffer)?;
        self.buffer.clear();
        self.flushes += 1;
        self.written += count;
        tracing::debug!(
            "Flushed {} records to {} (flush #{})",
            count,
            self.store.location(),
            self.flushes
        );
        Ok(count)
    }

    /// Number of records waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of flushes performed, including empty ones
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Number of records handed to the store so far
    pub fn records_written(&self) -> usize {
        self.written
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
