//! Storage traits and error types
//!
//! This module defines the trait interface for durable record stores and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only sink for serialized record lines
///
/// Implementations must never rewrite or reorder content already written;
/// each call appends the whole batch in one write.
pub trait RecordStore {
    /// Appends newline-terminated lines as a single write
    fn append_lines(&mut self, lines: &[String]) -> StorageResult<()>;

    /// Human-readable location used in log messages
    fn location(&self) -> String;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn append_lines(&mut self, lines: &[String]) -> StorageResult<()> {
        (**self).append_lines(lines)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
