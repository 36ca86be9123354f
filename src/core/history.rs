//! Bounded, FIFO-evicting interaction history.
//!
//! A [`BoundedHistoryStore`] keeps at most `max_length` records, oldest first.
//! Appending past capacity drops the oldest records. The whole sequence can be
//! written to and read back from a pretty-printed JSON array.

use crate::core::record::HistoryRecord;
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered, capped log of interaction records.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedHistoryStore {
    records: VecDeque<HistoryRecord>,
    max_length: usize,
}

impl BoundedHistoryStore {
    /// Create an empty store holding at most `max_length` records.
    ///
    /// A capacity of zero is allowed; such a store never holds anything.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_length.min(1024)),
            max_length,
        }
    }

    /// Maximum number of records kept.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record, evicting the oldest ones past capacity.
    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push_back(record);
        let evicted = self.evict_overflow();
        if evicted > 0 {
            debug!(evicted, max_length = self.max_length, "history at capacity");
        }
    }

    /// Copy of the current sequence, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        self.records.iter().cloned().collect()
    }

    /// Iterate over records, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// The newest `n` records, oldest first.
    #[must_use]
    pub fn last(&self, n: usize) -> Vec<HistoryRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    /// Remove every record.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Replace the contents, keeping only the newest `max_length` records.
    pub fn replace(&mut self, records: Vec<HistoryRecord>) {
        self.records = records.into();
        self.evict_overflow();
    }

    /// Write the current sequence to `path` as a JSON array.
    ///
    /// Any existing file is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoWrite`] if the document cannot be written.
    pub fn serialize(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, &self.records)?;
        debug!(path = %path.display(), records = self.records.len(), "history serialized");
        Ok(())
    }

    /// Replace the current sequence with the JSON array stored at `path`.
    ///
    /// On failure the store is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoRead`] if the file is missing, unreadable, or not a
    /// JSON array of records.
    pub fn restore(&mut self, path: &Path) -> Result<()> {
        let records = read_records(path)?;
        let loaded = records.len();
        self.replace(records);
        debug!(path = %path.display(), loaded, kept = self.records.len(), "history restored");
        Ok(())
    }

    fn evict_overflow(&mut self) -> usize {
        let excess = self.records.len().saturating_sub(self.max_length);
        self.records.drain(..excess);
        excess
    }
}

/// Read a JSON array of history records.
pub(crate) fn read_records(path: &Path) -> Result<Vec<HistoryRecord>> {
    let read_err = |source: io::Error| Error::IoRead {
        path: path.to_path_buf(),
        source,
    };
    let contents = fs::read_to_string(path).map_err(read_err)?;
    serde_json::from_str(&contents).map_err(|e| read_err(e.into()))
}

/// Pretty-print `value` to `path` through a sibling temp file and a rename.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let write_err = |source: io::Error| Error::IoWrite {
        path: path.to_path_buf(),
        source,
    };
    let contents = serde_json::to_string_pretty(value).map_err(|e| write_err(e.into()))?;

    let temp = temp_path(path);
    if let Err(e) = fs::write(&temp, contents) {
        let _ = fs::remove_file(&temp);
        return Err(write_err(e));
    }

    // Atomic rename so readers never see a half-written document
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(write_err(e));
    }
    Ok(())
}

/// `history.json` -> `history.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("history"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}
