//! File-based storage backend.
//!
//! Each session is one JSON array at `<base>/sessions/<session_id>.json`, the
//! same document [`BoundedHistoryStore::serialize`](crate::core::BoundedHistoryStore::serialize)
//! produces.

use crate::core::HistoryRecord;
use crate::core::history::{read_records, write_json_atomic};
use crate::error::Result;
use crate::storage::traits::{HistoryBackend, SessionSummary, validate_session_id};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-based storage backend with atomic writes.
#[derive(Debug)]
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a new file backend.
    ///
    /// Creates the sessions directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions directory cannot be created.
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(base_dir.join("sessions"))?;
        Ok(Self { base_dir })
    }

    /// Directory holding session files.
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.base_dir.join("sessions")
    }

    /// Get the path to a session file.
    ///
    /// # Errors
    ///
    /// Returns an error if the session id is not a safe file stem.
    pub fn session_path(&self, session_id: &str) -> Result<PathBuf> {
        validate_session_id(session_id)?;
        Ok(self.sessions_dir().join(format!("{session_id}.json")))
    }
}

impl HistoryBackend for FileBackend {
    fn get_history(&self, session_id: &str) -> Result<Option<Vec<HistoryRecord>>> {
        let path = self.session_path(session_id)?;
        if !path.exists() {
            return Ok(None);
        }
        read_records(&path).map(Some)
    }

    fn put_history(&self, session_id: &str, records: &[HistoryRecord]) -> Result<()> {
        let path = self.session_path(session_id)?;
        write_json_atomic(&path, records)?;
        debug!(session_id, records = records.len(), "session written");
        Ok(())
    }

    fn list_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        let sessions_dir = self.sessions_dir();
        let mut sessions = Vec::new();

        if !sessions_dir.exists() {
            return Ok(sessions);
        }

        for entry in fs::read_dir(&sessions_dir)? {
            let path = entry?.path();

            // Only .json files; temp files end in .tmp
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let Some(session_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Err(e) = validate_session_id(session_id) {
                warn!(path = %path.display(), error = %e, "skipping session with invalid id");
                continue;
            }

            match read_records(&path) {
                Ok(records) => {
                    let updated_at = modified_at(&path).unwrap_or_else(|_| Utc::now());
                    sessions.push(SessionSummary::from_records(session_id, &records, updated_at));
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable session"),
            }
        }

        // Most recently updated first
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    fn delete_session(&self, session_id: &str) -> Result<()> {
        let path = self.session_path(session_id)?;
        if path.exists() {
            fs::remove_file(&path)?;
            debug!(session_id, "session deleted");
        }
        Ok(())
    }
}

fn modified_at(path: &Path) -> io::Result<DateTime<Utc>> {
    Ok(fs::metadata(path)?.modified()?.into())
}
