//! In-memory storage backend for testing.

use crate::core::HistoryRecord;
use crate::error::{Error, Result};
use crate::storage::traits::{HistoryBackend, SessionSummary};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredHistory {
    records: Vec<HistoryRecord>,
    updated_at: DateTime<Utc>,
}

/// In-memory storage backend for testing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sessions: RwLock<HashMap<String, StoredHistory>>,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store records with an explicit update time.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn put_history_at(
        &self,
        session_id: &str,
        records: &[HistoryRecord],
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.insert(
            session_id.to_string(),
            StoredHistory {
                records: records.to_vec(),
                updated_at,
            },
        );
        Ok(())
    }
}

fn poisoned() -> Error {
    Error::InvalidState("memory backend lock poisoned".to_string())
}

impl HistoryBackend for MemoryBackend {
    fn get_history(&self, session_id: &str) -> Result<Option<Vec<HistoryRecord>>> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        Ok(sessions.get(session_id).map(|s| s.records.clone()))
    }

    fn put_history(&self, session_id: &str, records: &[HistoryRecord]) -> Result<()> {
        self.put_history_at(session_id, records, Utc::now())
    }

    fn list_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .map(|(id, stored)| {
                SessionSummary::from_records(id, &stored.records, stored.updated_at)
            })
            .collect();

        // Most recently updated first
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries.truncate(limit);
        Ok(summaries)
    }

    fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.remove(session_id);
        Ok(())
    }
}
