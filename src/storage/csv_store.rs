//! CSV file implementation of the record store

use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::STORE_HEADER;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Append-only CSV file holding `owner,item,resource_url` rows
#[derive(Debug)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    /// Opens the store, creating it with a header row if it does not exist
    ///
    /// An existing store is never rewritten. If its last line lacks a
    /// terminating newline one is appended so new rows start on their own
    /// line.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let store = Self {
            path: path.to_path_buf(),
        };

        let len = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(StorageError::io(path, e)),
        };

        if len == 0 {
            tracing::info!("Creating record store at {}", path.display());
            store.write_all(format!("{}\n", STORE_HEADER.join(",")).as_bytes())?;
        } else if !store.ends_with_newline()? {
            store.write_all(b"\n")?;
        }

        Ok(store)
    }

    fn ends_with_newline(&self) -> StorageResult<bool> {
        let mut file = File::open(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        file.seek(SeekFrom::End(-1))
            .map_err(|e| StorageError::io(&self.path, e))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)
            .map_err(|e| StorageError::io(&self.path, e))?;
        Ok(last[0] == b'\n')
    }

    fn write_all(&self, bytes: &[u8]) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.write_all(bytes)
            .and_then(|_| file.sync_data())
            .map_err(|e| StorageError::io(&self.path, e))
    }
}

impl RecordStore for CsvFileStore {
    fn append_lines(&mut self, lines: &[String]) -> StorageResult<()> {
        if lines.is_empty() {
            return Ok(());
        }
        self.write_all(lines.concat().as_bytes())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.csv");

        CsvFileStore::open(&path).unwrap();
        CsvFileStore::open(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "owner,item,resource_url\n");
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.csv");
        std::fs::write(&path, "user,id,photo_url\nA,1,https://x/1.jpg\n").unwrap();

        let mut store = CsvFileStore::open(&path).unwrap();
        store
            .append_lines(&["A,2,\n".to_string(), "B,3,https://x/3.jpg\n".to_string()])
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "user,id,photo_url\nA,1,https://x/1.jpg\nA,2,\nB,3,https://x/3.jpg\n"
        );
    }

    #[test]
    fn test_open_terminates_partial_last_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.csv");
        std::fs::write(&path, "owner,item,resource_url\nA,1,https://x/1.jpg").unwrap();

        let mut store = CsvFileStore::open(&path).unwrap();
        store.append_lines(&["A,2,\n".to_string()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "owner,item,resource_url\nA,1,https://x/1.jpg\nA,2,\n");
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.csv");
        let mut store = CsvFileStore::open(&path).unwrap();
        store.append_lines(&[]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "owner,item,resource_url\n"
        );
    }
}
